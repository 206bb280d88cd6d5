//! # Variant Search Module
//!
//! Ricerca greedy a due livelli sulla griglia (scala, qualità).
//!
//! ## Strategia:
//! 1. Le scale vengono provate dalla più grande alla più piccola
//! 2. Per ogni scala si ricampiona l'originale e si provano le qualità dalla più alta
//! 3. La prima qualità che entra in `target_size` viene accettata e si passa alla scala successiva
//! 4. La ricerca termina quando:
//!    - sono state accettate `max_images` varianti
//!    - una dimensione scende sotto `MIN_DIMENSION` pixel (le scale più piccole sono inutili)
//!    - le scale sono esaurite
//!
//! Ogni variante accettata viene passata subito al callback `on_fit`, che la
//! persiste: una scala senza qualità valide non produce nulla.

use serde::Serialize;

use crate::codec::VariantEncoder;
use crate::error::FitResult;

/// Smallest width or height worth encoding
pub const MIN_DIMENSION: u32 = 10;

/// Limits of a single image search
#[derive(Debug, Clone, Copy)]
pub struct SearchLimits<'a> {
    pub quality_levels: &'a [u8],
    pub resize_levels: &'a [f64],
    pub target_size: u64,
    pub max_images: usize,
}

/// An accepted encode, ready to be persisted
#[derive(Debug, Clone)]
pub struct Variant {
    /// 1-based sequence number among the accepted variants of this image
    pub index: usize,
    pub scale: f64,
    pub quality: u8,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

/// One encode that was tried
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attempt {
    pub scale: f64,
    pub quality: u8,
    pub size: u64,
}

/// Why the search stopped
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum StopReason {
    MaxImagesReached,
    ResolutionTooSmall { scale: f64, width: u32, height: u32 },
    LevelsExhausted,
}

/// Result of searching a single image
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub accepted: usize,
    pub attempts: Vec<Attempt>,
    pub stop: StopReason,
}

/// Candidate resolution for `scale`, rounded to the nearest pixel
pub fn scaled_dimensions(width: u32, height: u32, scale: f64) -> (u32, u32) {
    let scaled = |value: u32| (value as f64 * scale).round() as u32;
    (scaled(width), scaled(height))
}

/// Run the (scale, quality) search, handing every fitting variant to `on_fit`
pub fn search_variants<E, F>(
    encoder: &E,
    limits: SearchLimits<'_>,
    mut on_fit: F,
) -> FitResult<SearchOutcome>
where
    E: VariantEncoder,
    F: FnMut(Variant) -> FitResult<()>,
{
    let (original_width, original_height) = encoder.dimensions();
    let mut accepted = 0;
    let mut attempts = Vec::new();

    if accepted >= limits.max_images {
        return Ok(SearchOutcome {
            accepted,
            attempts,
            stop: StopReason::MaxImagesReached,
        });
    }

    for &scale in limits.resize_levels {
        let (width, height) = scaled_dimensions(original_width, original_height, scale);
        if width < MIN_DIMENSION || height < MIN_DIMENSION {
            return Ok(SearchOutcome {
                accepted,
                attempts,
                stop: StopReason::ResolutionTooSmall { scale, width, height },
            });
        }

        let resampled = encoder.resample(width, height)?;

        for &quality in limits.quality_levels {
            let bytes = encoder.encode(&resampled, quality)?;
            let size = bytes.len() as u64;
            attempts.push(Attempt { scale, quality, size });

            if size <= limits.target_size {
                accepted += 1;
                on_fit(Variant {
                    index: accepted,
                    scale,
                    quality,
                    width,
                    height,
                    bytes,
                })?;
                break;
            }
        }

        if accepted >= limits.max_images {
            return Ok(SearchOutcome {
                accepted,
                attempts,
                stop: StopReason::MaxImagesReached,
            });
        }
    }

    Ok(SearchOutcome {
        accepted,
        attempts,
        stop: StopReason::LevelsExhausted,
    })
}
