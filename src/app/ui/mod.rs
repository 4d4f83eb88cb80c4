mod controls;
mod details;
mod panels;

use eframe::egui::{Context, Visuals};

pub(in crate::app) fn apply_theme(ctx: &Context, dark_mode: bool) {
    ctx.set_visuals(if dark_mode {
        Visuals::dark()
    } else {
        Visuals::light()
    });
}
