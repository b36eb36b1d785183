use serde::{Deserialize, Serialize};

use super::player::PlayerName;
use super::room::RoomId;

/// Grid overlay positioning for an active map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    pub width: f64,
    pub height: f64,
    pub opacity: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

/// Image positioning/scaling for an active map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapImageConfig {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

/// A map document. At most one row per room has `active == true`, keyed by
/// `(room_id, filename)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveMap {
    pub room_id: RoomId,
    pub filename: String,
    pub original_filename: String,
    pub file_path: String,
    pub grid_config: Option<GridConfig>,
    pub map_image_config: Option<MapImageConfig>,
    pub uploaded_by: PlayerName,
    pub active: bool,
}
