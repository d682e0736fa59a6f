use eframe::egui::{self, Align2, Color32, Context, FontId, Id, LayerId, Order, Painter, Rect};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::color::{to_color32, SECONDARY};
use crate::config::BackgroundKind;
use crate::particles::{BubbleField, ParticleField};

/// Minimum time the loading overlay stays up, in seconds.
const LOADING_MIN_SECS: f64 = 1.5;

fn opacity(alpha: f32) -> u8 {
    (alpha.clamp(0.0, 1.0) * 255.0).round() as u8
}

// ---------------------------------------------------------------------------
// Drifting particles behind the panels
// ---------------------------------------------------------------------------

pub struct ParticleBackground {
    field: Option<ParticleField>,
    rng: StdRng,
}

impl ParticleBackground {
    pub fn new() -> Self {
        Self {
            field: None,
            rng: StdRng::from_entropy(),
        }
    }

    /// Advance one step and paint onto the background layer.
    pub fn paint(&mut self, ctx: &Context) {
        let screen = ctx.screen_rect();
        let rng = &mut self.rng;
        let field = self
            .field
            .get_or_insert_with(|| ParticleField::new(screen.width(), screen.height(), rng));
        if field.width != screen.width() || field.height != screen.height() {
            field.resize(screen.width(), screen.height());
        }
        field.step();

        let painter = ctx.layer_painter(LayerId::background());
        for p in &field.particles {
            painter.circle_filled(
                screen.min + egui::vec2(p.x, p.y),
                p.size,
                Color32::from_rgba_unmultiplied(30, 64, 175, opacity(p.opacity)),
            );
        }
    }
}

impl Default for ParticleBackground {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Rising bubbles behind the panels
// ---------------------------------------------------------------------------

pub struct BubbleBackground {
    field: Option<BubbleField>,
    rng: StdRng,
}

impl BubbleBackground {
    pub fn new() -> Self {
        Self {
            field: None,
            rng: StdRng::from_entropy(),
        }
    }

    /// Advance one step and paint onto the background layer. A window resize
    /// reseeds the field.
    pub fn paint(&mut self, ctx: &Context) {
        let screen = ctx.screen_rect();
        let rng = &mut self.rng;
        let field = self
            .field
            .get_or_insert_with(|| BubbleField::new(screen.width(), screen.height(), rng));
        if field.width != screen.width() || field.height != screen.height() {
            field.resize(screen.width(), screen.height(), rng);
        }
        field.step(rng);

        let painter = ctx.layer_painter(LayerId::background());
        paint_bubbles(&painter, screen, field, to_color32(SECONDARY));
    }
}

impl Default for BubbleBackground {
    fn default() -> Self {
        Self::new()
    }
}

/// The decorative layer selected in the configuration.
pub enum Backdrop {
    Particles(ParticleBackground),
    Bubbles(BubbleBackground),
}

impl Backdrop {
    /// `None` when the background animation is switched off.
    pub fn from_kind(kind: BackgroundKind) -> Option<Self> {
        match kind {
            BackgroundKind::Particles => Some(Backdrop::Particles(ParticleBackground::new())),
            BackgroundKind::Bubbles => Some(Backdrop::Bubbles(BubbleBackground::new())),
            BackgroundKind::None => None,
        }
    }

    pub fn paint(&mut self, ctx: &Context) {
        match self {
            Backdrop::Particles(p) => p.paint(ctx),
            Backdrop::Bubbles(b) => b.paint(ctx),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading overlay with rising bubbles
// ---------------------------------------------------------------------------

pub struct LoadingOverlay {
    bubbles: Option<BubbleField>,
    rng: StdRng,
    done: bool,
}

impl LoadingOverlay {
    pub fn new() -> Self {
        Self {
            bubbles: None,
            rng: StdRng::from_entropy(),
            done: false,
        }
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Paint the overlay until the minimum display time has passed.
    pub fn paint(&mut self, ctx: &Context) {
        if self.done {
            return;
        }
        if ctx.input(|i| i.time) >= LOADING_MIN_SECS {
            self.done = true;
            self.bubbles = None;
            return;
        }

        let screen = ctx.screen_rect();
        let rng = &mut self.rng;
        let field = self
            .bubbles
            .get_or_insert_with(|| BubbleField::new(screen.width(), screen.height(), rng));
        if field.width != screen.width() || field.height != screen.height() {
            field.resize(screen.width(), screen.height(), rng);
        }
        field.step(rng);

        let painter = ctx.layer_painter(LayerId::new(Order::Foreground, Id::new("loading_overlay")));
        painter.rect_filled(screen, 0.0, Color32::from_rgb(0x1e, 0x40, 0xaf));
        paint_bubbles(&painter, screen, field, Color32::WHITE);
        painter.text(
            screen.center(),
            Align2::CENTER_CENTER,
            "Loading...",
            FontId::proportional(32.0),
            Color32::WHITE,
        );
    }
}

impl Default for LoadingOverlay {
    fn default() -> Self {
        Self::new()
    }
}

fn paint_bubbles(painter: &Painter, screen: Rect, field: &BubbleField, tint: Color32) {
    let shade =
        |alpha: f32| Color32::from_rgba_unmultiplied(tint.r(), tint.g(), tint.b(), opacity(alpha));
    for b in &field.bubbles {
        let center = screen.min + egui::vec2(b.x, b.y);
        painter.circle_filled(center, b.radius, shade(b.opacity));
        // shine
        painter.circle_filled(
            center - egui::vec2(b.radius * 0.3, b.radius * 0.3),
            b.radius * 0.2,
            shade(b.opacity + 0.3),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backdrop_follows_configured_kind() {
        assert!(matches!(
            Backdrop::from_kind(BackgroundKind::Particles),
            Some(Backdrop::Particles(_))
        ));
        assert!(matches!(
            Backdrop::from_kind(BackgroundKind::Bubbles),
            Some(Backdrop::Bubbles(_))
        ));
        assert!(Backdrop::from_kind(BackgroundKind::None).is_none());
    }

    #[test]
    fn opacity_is_clamped() {
        assert_eq!(opacity(1.4), 255);
        assert_eq!(opacity(-0.2), 0);
        assert_eq!(opacity(0.5), 128);
    }
}
