//! "Loading" overlay. Stays opaque until loading finishes, then plays a short
//! timeline: characters rise and fade one after another, then the backdrop
//! fades out.

use crate::core::{Easing, Tween};

pub const LOADING_TEXT: &str = "Loading";

const CHAR_DURATION: f32 = 0.5;
const CHAR_STAGGER: f32 = 0.03;
/// Fraction of the glyph height each character rises
const CHAR_RISE: f32 = 0.5;
const BACKDROP_DELAY: f32 = 1.0;
const BACKDROP_DURATION: f32 = 1.0;
const FONT_SIZE: f32 = 48.0;

/// Per-character animation state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharState {
    /// Upward offset as a fraction of the glyph height
    pub rise: f32,
    pub alpha: f32,
}

#[derive(Debug, Clone)]
pub struct LoadingOverlay {
    text: String,
    chars: Vec<Tween>,
    backdrop: Tween,
    /// Seconds since `start`, `None` before
    time: Option<f32>,
}

impl LoadingOverlay {
    pub fn new(text: &str) -> Self {
        let chars: Vec<Tween> = (0..text.chars().count())
            .map(|i| Tween::new(i as f32 * CHAR_STAGGER, CHAR_DURATION, Easing::Power4InOut))
            .collect();
        let chars_end = chars.iter().map(Tween::end).fold(0.0, f32::max);
        let backdrop = Tween::new(chars_end + BACKDROP_DELAY, BACKDROP_DURATION, Easing::Power1Out);

        Self {
            text: text.to_owned(),
            chars,
            backdrop,
            time: None,
        }
    }

    /// Starts the fade-out timeline. Later calls do nothing.
    pub fn start(&mut self) {
        if self.time.is_none() {
            log::debug!("Loading overlay fading out");
            self.time = Some(0.0);
        }
    }

    pub fn advance(&mut self, delta: f32) {
        if let Some(time) = &mut self.time {
            *time += delta;
        }
    }

    pub fn is_started(&self) -> bool {
        self.time.is_some()
    }

    pub fn is_finished(&self) -> bool {
        self.time.is_some_and(|t| t >= self.backdrop.end())
    }

    /// Total timeline length in seconds
    pub fn duration(&self) -> f32 {
        self.backdrop.end()
    }

    pub fn char_state(&self, index: usize) -> CharState {
        let progress = match (self.time, self.chars.get(index)) {
            (Some(t), Some(tween)) => tween.progress(t),
            _ => 0.0,
        };
        CharState {
            rise: CHAR_RISE * progress,
            alpha: 1.0 - progress,
        }
    }

    pub fn backdrop_alpha(&self) -> f32 {
        match self.time {
            Some(t) => 1.0 - self.backdrop.progress(t),
            None => 1.0,
        }
    }

    /// Paints the backdrop and text over everything else
    pub fn show(&self, ctx: &egui::Context) {
        if self.is_finished() {
            return;
        }

        let screen = ctx.screen_rect();
        let painter = ctx.layer_painter(egui::LayerId::new(
            egui::Order::Foreground,
            egui::Id::new("loading_overlay"),
        ));
        painter.rect_filled(screen, 0.0, fade(egui::Color32::BLACK, self.backdrop_alpha()));

        let font = egui::FontId::proportional(FONT_SIZE);
        let galleys: Vec<_> = self
            .text
            .chars()
            .map(|c| painter.layout_no_wrap(c.to_string(), font.clone(), egui::Color32::WHITE))
            .collect();
        let width: f32 = galleys.iter().map(|g| g.size().x).sum();

        let mut x = screen.center().x - width * 0.5;
        for (i, galley) in galleys.into_iter().enumerate() {
            let state = self.char_state(i);
            let size = galley.size();
            let pos = egui::pos2(x, screen.center().y - size.y * (0.5 + state.rise));
            x += size.x;
            painter.galley_with_override_text_color(pos, galley, fade(egui::Color32::WHITE, state.alpha));
        }
    }
}

impl Default for LoadingOverlay {
    fn default() -> Self {
        Self::new(LOADING_TEXT)
    }
}

fn fade(color: egui::Color32, alpha: f32) -> egui::Color32 {
    color.gamma_multiply(alpha.clamp(0.0, 1.0))
}
