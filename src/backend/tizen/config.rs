//! Config enumeration
//!
//! Every driver config is offered once per supported surface type and candidate visual. The
//! windowing system decides which combinations it can display, the driver decides which of
//! those end up as distinct EGL configs.

use tracing::{debug, trace};

use crate::backend::egl::{ffi, EglConfig, SurfaceKind};

use super::{NativePlatform, SwrastDriver, VisualRequest};

/// Bits per pixel requested from the windowing system for every visual
pub const CONFIG_DEPTH: u32 = 32;

/// Candidate visual offered for every driver config
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visual {
    /// Red, green, blue and alpha channel masks
    pub rgba_masks: [u32; 4],
    /// Bits of the red channel
    pub red: u32,
    /// Bits of the green channel
    pub green: u32,
    /// Bits of the blue channel
    pub blue: u32,
    /// Bits of the alpha channel
    pub alpha: u32,
}

impl Visual {
    fn request(&self) -> VisualRequest {
        VisualRequest {
            red: self.red,
            green: self.green,
            blue: self.blue,
            alpha: self.alpha,
            depth: CONFIG_DEPTH,
        }
    }
}

/// 8-8-8 without alpha, then 8-8-8-8 with alpha
pub const VISUALS: [Visual; 2] = [
    Visual {
        rgba_masks: [0x00ff_0000, 0x0000_ff00, 0x0000_00ff, 0],
        red: 8,
        green: 8,
        blue: 8,
        alpha: 0,
    },
    Visual {
        rgba_masks: [0x00ff_0000, 0x0000_ff00, 0x0000_00ff, 0xff00_0000],
        red: 8,
        green: 8,
        blue: 8,
        alpha: 8,
    },
];

const SURFACE_KINDS: [SurfaceKind; 2] = [SurfaceKind::Window, SurfaceKind::Pixmap];

/// Register the EGL configs of a display.
///
/// Config ids are handed out consecutively starting at one. A config the driver collapsed into
/// an earlier one comes back with that earlier id and is not counted again.
pub(super) fn add_configs<P, D>(platform: &P, driver: &mut D) -> Vec<EglConfig<D::Config>>
where
    P: NativePlatform,
    D: SwrastDriver,
{
    let mut configs = Vec::new();
    let driver_configs = driver.driver_configs().to_vec();

    for kind in SURFACE_KINDS {
        for driver_config in &driver_configs {
            for visual in &VISUALS {
                let matched = match platform.query_config(kind, &visual.request()) {
                    Ok(matched) => matched,
                    Err(err) => {
                        trace!(?kind, ?visual, ?err, "Visual not supported");
                        continue;
                    }
                };

                let config_id = configs.len() as ffi::EGLint + 1;
                let attributes = [ffi::NATIVE_VISUAL_ID, matched.native_visual_id, ffi::NONE];
                let registered = driver.add_config(
                    driver_config,
                    config_id,
                    kind.surface_type(),
                    &attributes,
                    visual.rgba_masks,
                );

                match registered {
                    Some(config) if config.config_id == config_id => {
                        debug!(
                            config_id,
                            ?kind,
                            native_visual_id = matched.native_visual_id,
                            is_slow = matched.is_slow,
                            "Added config"
                        );
                        configs.push(config);
                    }
                    Some(config) => {
                        trace!(config_id = config.config_id, ?kind, "Config merged into an existing one")
                    }
                    None => trace!(config_id, ?kind, "Driver rejected config"),
                }
            }
        }
    }

    configs
}
