//! Application constants

/// Cloudinary folder that uploaded videos are placed in
pub const MEDIA_FOLDER: &str = "cliptube_videos";

/// Incoming transformation applied on upload: bound height to 480p, good auto quality
pub const UPLOAD_TRANSFORMATION: &str = "c_limit,h_480,q_auto:good";

/// Delivery transformation for the derived 320x180 JPEG thumbnail
pub const THUMBNAIL_TRANSFORMATION: &str = "c_fill,g_auto,h_180,q_auto,w_320";

/// Default maximum upload size (200 MB)
pub const DEFAULT_MAX_UPLOAD_SIZE_MB: usize = 200;

/// Default listen port
pub const DEFAULT_PORT: u16 = 3001;

/// Default JSON file backing the local variant
pub const DEFAULT_VIDEOS_FILE: &str = "videos.json";

/// Display duration given to videos added by URL
pub const INITIAL_DURATION: &str = "0:00";

pub const UPLOAD_MESSAGE: &str = "Video successfully uploaded and is being processed!";
pub const LOCAL_UPLOAD_MESSAGE: &str = "Video successfully added.";
pub const DELETE_MESSAGE: &str = "Video successfully deleted.";
