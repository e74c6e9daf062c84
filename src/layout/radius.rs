use serde::{Deserialize, Serialize};

use super::style::{parse_color, LayoutStyle, StyleConfig};

/// Wide containers (aspect at or above this) size the dome by width in `auto` mode.
const AUTO_WIDE_ASPECT: f64 = 1.3;
/// The dome radius never exceeds this multiple of the container height.
const HEIGHT_GUARD: f64 = 1.35;
/// Smallest viewport padding, in pixels.
const MIN_PADDING_PX: f64 = 8.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitBasis {
    #[default]
    Auto,
    Min,
    Max,
    Width,
    Height,
}

impl FitBasis {
    pub fn all() -> &'static [FitBasis] {
        &[FitBasis::Auto, FitBasis::Min, FitBasis::Max, FitBasis::Width, FitBasis::Height]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Auto => "Auto",
            Self::Min => "Shorter side",
            Self::Max => "Longer side",
            Self::Width => "Width",
            Self::Height => "Height",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RadiusConfig {
    pub fit: f64,
    pub fit_basis: FitBasis,
    pub min_radius: f64,
    pub max_radius: f64,
    pub pad_factor: f64,
}

impl Default for RadiusConfig {
    fn default() -> Self {
        Self {
            fit: 0.5,
            fit_basis: FitBasis::Auto,
            min_radius: 600.0,
            max_radius: f64::INFINITY,
            pad_factor: 0.25,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedLayout {
    pub radius_px: f64,
    pub padding_px: f64,
}

/// Derive the dome radius and viewport padding for a container size.
///
/// Rounding happens only here, so resolving the same size twice gives the
/// same answer.
pub fn resolve_layout(config: &RadiusConfig, width: f64, height: f64) -> ResolvedLayout {
    let w = width.max(1.0);
    let h = height.max(1.0);
    let min_dim = w.min(h);
    let max_dim = w.max(h);

    let basis = match config.fit_basis {
        FitBasis::Min => min_dim,
        FitBasis::Max => max_dim,
        FitBasis::Width => w,
        FitBasis::Height => h,
        FitBasis::Auto => {
            if w / h >= AUTO_WIDE_ASPECT {
                w
            } else {
                min_dim
            }
        }
    };

    let radius = (basis * config.fit).min(h * HEIGHT_GUARD);
    let radius = radius.max(config.min_radius).min(config.max_radius);

    ResolvedLayout {
        radius_px: radius.round(),
        padding_px: (min_dim * config.pad_factor).round().max(MIN_PADDING_PX),
    }
}

/// Tracks container size observations and publishes the derived style.
pub struct RadiusResolver {
    config: RadiusConfig,
    style: StyleConfig,
    published: LayoutStyle,
}

impl RadiusResolver {
    pub fn new(config: RadiusConfig, style: StyleConfig) -> Self {
        let published = Self::compose(&style, ResolvedLayout {
            radius_px: config.min_radius.round(),
            padding_px: MIN_PADDING_PX,
        });
        Self {
            config,
            style,
            published,
        }
    }

    fn compose(style: &StyleConfig, layout: ResolvedLayout) -> LayoutStyle {
        LayoutStyle {
            radius_px: layout.radius_px,
            padding_px: layout.padding_px,
            overlay_color: parse_color(&style.overlay_blur_color),
            tile_radius_px: style.image_border_radius.max(0.0),
            image_filter: style.image_filter(),
        }
    }

    /// Record a container size. Returns the new style when it differs from the last one published.
    pub fn observe(&mut self, width: f64, height: f64) -> Option<LayoutStyle> {
        let layout = resolve_layout(&self.config, width, height);
        let next = Self::compose(&self.style, layout);
        if next == self.published {
            return None;
        }
        log::debug!("layout: radius {}px, padding {}px", next.radius_px, next.padding_px);
        self.published = next;
        Some(next)
    }

    /// Swap the policy; the caller re-observes to republish.
    pub fn reconfigure(&mut self, config: RadiusConfig, style: StyleConfig) {
        self.config = config;
        self.style = style;
    }

    pub fn current(&self) -> LayoutStyle {
        self.published
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(fit_basis: FitBasis) -> RadiusConfig {
        RadiusConfig {
            fit_basis,
            min_radius: 0.0,
            ..RadiusConfig::default()
        }
    }

    #[test]
    fn test_basis_selection() {
        assert_eq!(resolve_layout(&config(FitBasis::Min), 1000.0, 800.0).radius_px, 400.0);
        assert_eq!(resolve_layout(&config(FitBasis::Max), 1000.0, 800.0).radius_px, 500.0);
        assert_eq!(resolve_layout(&config(FitBasis::Width), 600.0, 800.0).radius_px, 300.0);
        assert_eq!(resolve_layout(&config(FitBasis::Height), 1000.0, 800.0).radius_px, 400.0);
    }

    #[test]
    fn test_auto_uses_width_when_wide() {
        let c = config(FitBasis::Auto);
        assert_eq!(resolve_layout(&c, 1300.0, 1000.0).radius_px, 650.0);
        assert_eq!(resolve_layout(&c, 1200.0, 1000.0).radius_px, 500.0);
    }

    #[test]
    fn test_height_guard() {
        let c = RadiusConfig {
            fit: 2.0,
            ..config(FitBasis::Width)
        };
        // 2000 * 2 would be 4000; guard caps at 300 * 1.35.
        assert_eq!(resolve_layout(&c, 2000.0, 300.0).radius_px, 405.0);
    }

    #[test]
    fn test_radius_clamped_to_range() {
        let c = RadiusConfig {
            min_radius: 600.0,
            max_radius: 900.0,
            ..RadiusConfig::default()
        };
        assert_eq!(resolve_layout(&c, 400.0, 300.0).radius_px, 600.0);
        assert_eq!(resolve_layout(&c, 4000.0, 3000.0).radius_px, 900.0);
        for (w, h) in [(1.0, 1.0), (320.0, 640.0), (1920.0, 1080.0), (5000.0, 200.0)] {
            let r = resolve_layout(&c, w, h).radius_px;
            assert!((600.0..=900.0).contains(&r), "{w}x{h} -> {r}");
        }
    }

    #[test]
    fn test_inverted_range_prefers_max() {
        let c = RadiusConfig {
            min_radius: 800.0,
            max_radius: 500.0,
            ..RadiusConfig::default()
        };
        assert_eq!(resolve_layout(&c, 1000.0, 1000.0).radius_px, 500.0);
    }

    #[test]
    fn test_rounding_and_padding() {
        let c = config(FitBasis::Min);
        let layout = resolve_layout(&c, 1001.0, 1001.0);
        assert_eq!(layout.radius_px, 501.0);
        assert_eq!(layout.padding_px, 250.0);
        assert_eq!(resolve_layout(&c, 20.0, 20.0).padding_px, 8.0);
    }

    #[test]
    fn test_degenerate_size_is_floored() {
        let layout = resolve_layout(&config(FitBasis::Auto), 0.0, -5.0);
        assert_eq!(layout.padding_px, 8.0);
        assert!(layout.radius_px.is_finite());
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let mut resolver = RadiusResolver::new(RadiusConfig::default(), StyleConfig::default());
        let first = resolver.observe(1920.0, 1080.0);
        assert!(first.is_some());
        assert_eq!(resolver.observe(1920.0, 1080.0), None);
        assert_eq!(resolver.current().radius_px, 960.0);
        assert_eq!(resolver.current().padding_px, 270.0);
    }

    #[test]
    fn test_published_style_passes_knobs_through() {
        let style = StyleConfig {
            overlay_blur_color: "#000".to_string(),
            image_border_radius: 12.0,
            grayscale: true,
        };
        let mut resolver = RadiusResolver::new(RadiusConfig::default(), style);
        let published = resolver.observe(800.0, 600.0).expect("first observation publishes");
        assert_eq!(published.overlay_color, [0.0, 0.0, 0.0]);
        assert_eq!(published.tile_radius_px, 12.0);
        assert_eq!(published.image_filter, crate::layout::style::ImageFilter::Grayscale);
        assert_eq!(published.radius_px, 600.0);
    }
}
