//! Per-pixel opacity masks for precise bullet collisions.
//!
//! Masks are built from sprite pixels on a background thread when a level
//! loads; the first query blocks until the build has finished.

use std::collections::HashMap;
use std::thread::JoinHandle;

use tracing::{debug, error};

use spacekiller_core::enums::ShipKind;

/// Masks by enemy kind. Kinds without an entry collide on their box.
pub type MaskStore = HashMap<ShipKind, MaskLoader>;

/// Opaque/transparent bitmap, row 0 at the top like the source image.
#[derive(Debug, Clone)]
pub struct OpacityMask {
    width: usize,
    height: usize,
    opaque: Vec<bool>,
}

impl OpacityMask {
    /// Build a mask from RGBA8 pixels; alpha strictly above `threshold`
    /// counts as opaque. Missing trailing pixels count as transparent.
    pub fn from_rgba(width: usize, height: usize, rgba: &[u8], threshold: u8) -> Self {
        let opaque = (0..width * height)
            .map(|i| rgba.get(i * 4 + 3).is_some_and(|&alpha| alpha > threshold))
            .collect();
        Self {
            width,
            height,
            opaque,
        }
    }

    /// Mask treating every pixel as opaque.
    pub fn solid(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            opaque: vec![true; width * height],
        }
    }

    pub fn is_opaque(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.opaque[y * self.width + x]
    }

    /// Sample at normalized coordinates, `v` = 0 at the bottom edge
    /// (screen space grows upward, image rows grow downward).
    pub fn is_opaque_at(&self, u: f32, v: f32) -> bool {
        if self.width == 0 || self.height == 0 || !(0.0..=1.0).contains(&u) || !(0.0..=1.0).contains(&v)
        {
            return false;
        }
        let x = ((u * self.width as f32) as usize).min(self.width - 1);
        let row_from_bottom = ((v * self.height as f32) as usize).min(self.height - 1);
        self.is_opaque(x, self.height - 1 - row_from_bottom)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }
}

/// A mask that may still be building on a background thread.
#[derive(Debug)]
pub struct MaskLoader {
    handle: Option<JoinHandle<OpacityMask>>,
    mask: Option<OpacityMask>,
    fallback_size: (usize, usize),
}

impl MaskLoader {
    /// Start building a mask from `rgba` on a background thread.
    pub fn spawn(width: usize, height: usize, rgba: Vec<u8>, threshold: u8) -> Self {
        let handle = std::thread::Builder::new()
            .name("spacekiller-mask".into())
            .spawn(move || OpacityMask::from_rgba(width, height, &rgba, threshold));
        match handle {
            Ok(handle) => Self {
                handle: Some(handle),
                mask: None,
                fallback_size: (width, height),
            },
            Err(err) => {
                error!("could not start mask thread, using solid mask: {err}");
                Self::ready(OpacityMask::solid(width, height))
            }
        }
    }

    /// Wrap an already built mask.
    pub fn ready(mask: OpacityMask) -> Self {
        let fallback_size = (mask.width(), mask.height());
        Self {
            handle: None,
            mask: Some(mask),
            fallback_size,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.mask.is_some() || self.handle.as_ref().is_some_and(|h| h.is_finished())
    }

    /// The built mask, blocking on the background thread the first time.
    pub fn get(&mut self) -> &OpacityMask {
        if let Some(handle) = self.handle.take() {
            let mask = match handle.join() {
                Ok(mask) => mask,
                Err(_) => {
                    error!("mask thread panicked, using solid mask");
                    OpacityMask::solid(self.fallback_size.0, self.fallback_size.1)
                }
            };
            debug!(width = mask.width(), height = mask.height(), "opacity mask ready");
            self.mask = Some(mask);
        }
        self.mask.get_or_insert_with(|| {
            OpacityMask::solid(self.fallback_size.0, self.fallback_size.1)
        })
    }
}
