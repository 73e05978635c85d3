use serde::Deserialize;

/// Options for building a render plan.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOptions {
    /// Flat path color (default: "#4285F4")
    #[serde(default = "default_path_color")]
    pub path_color: String,

    /// Path stroke width in pixels (default: 5)
    #[serde(default = "default_path_weight")]
    pub path_weight: f64,

    /// Start marker color (default: "green")
    #[serde(default = "default_start_color")]
    pub start_color: String,

    /// End marker color (default: "red")
    #[serde(default = "default_end_color")]
    pub end_color: String,

    /// Color the path by elevation when every point has one (default: true)
    #[serde(default = "default_true")]
    pub elevation_gradient: bool,

    /// Low / mid / high stops of the elevation palette
    #[serde(default)]
    pub palette: ElevationPalette,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            path_color: default_path_color(),
            path_weight: default_path_weight(),
            start_color: default_start_color(),
            end_color: default_end_color(),
            elevation_gradient: true,
            palette: ElevationPalette::default(),
        }
    }
}

/// Three hex colors (`#rrggbb`) anchored at the lowest, middle and highest
/// elevation of a track.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ElevationPalette {
    /// (default: "#1a9850")
    #[serde(default = "default_low")]
    pub low: String,

    /// (default: "#fee08b")
    #[serde(default = "default_mid")]
    pub mid: String,

    /// (default: "#d73027")
    #[serde(default = "default_high")]
    pub high: String,
}

impl Default for ElevationPalette {
    fn default() -> Self {
        Self {
            low: default_low(),
            mid: default_mid(),
            high: default_high(),
        }
    }
}

fn default_low() -> String {
    "#1a9850".to_string()
}

fn default_mid() -> String {
    "#fee08b".to_string()
}

fn default_high() -> String {
    "#d73027".to_string()
}

fn default_path_color() -> String {
    "#4285F4".to_string()
}

fn default_path_weight() -> f64 {
    5.0
}

fn default_start_color() -> String {
    "green".to_string()
}

fn default_end_color() -> String {
    "red".to_string()
}

fn default_true() -> bool {
    true
}
