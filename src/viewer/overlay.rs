//! The egui overlay: header, upload controls, instructions and the memory
//! card for the selected photo.
//!
//! Drawing never mutates the session. Clicks and edits come back as
//! [`UiAction`]s that the app applies after the UI pass.

use egui::{Align, Align2, Color32, Layout, RichText};

use crate::selection::{MemoryStatus, Selection};
use crate::session::Session;

const GOLD: Color32 = Color32::from_rgb(230, 190, 80);
const EMERALD: Color32 = Color32::from_rgb(110, 200, 150);
const MUTED: Color32 = Color32::from_rgb(150, 190, 165);

/// Something the user asked for through the overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    Upload,
    ClearUploads,
    SetMessage(String),
    Generate,
    Dismiss,
}

/// Overlay state that outlives a frame.
#[derive(Debug, Default)]
pub struct OverlayState {
    draft: String,
    draft_for: Option<u32>,
}

impl OverlayState {
    /// Keep the text box in step with the selection: a new photo starts
    /// with an empty draft.
    fn sync(&mut self, selection: &Selection) {
        let id = selection.photo_id();
        if id != self.draft_for {
            self.draft = selection
                .selected()
                .map(|s| s.message.clone())
                .unwrap_or_default();
            self.draft_for = id;
        }
    }
}

pub fn draw(ctx: &egui::Context, session: &Session, state: &mut OverlayState, actions: &mut Vec<UiAction>) {
    state.sync(session.selection());

    header(ctx, session, actions);
    instructions(ctx);
    if let Selection::Selected(_) = session.selection() {
        memory_card(ctx, session.selection(), state, actions);
    }
}

fn header(ctx: &egui::Context, session: &Session, actions: &mut Vec<UiAction>) {
    egui::Area::new(egui::Id::new("header"))
        .anchor(Align2::LEFT_TOP, [28.0, 22.0])
        .show(ctx, |ui| {
            ui.label(RichText::new("Merry Christmas").size(42.0).strong().color(GOLD));
            ui.label(
                RichText::new("INTERACTIVE HOLIDAY WISHING TREE")
                    .size(12.0)
                    .color(EMERALD),
            );

            if session.textures_loading() > 0 {
                ui.add_space(8.0);
                ui.label(RichText::new("Summoning Holiday Magic...").italics().color(MUTED));
            }
        });

    let uploaded = session.scene().photos().uploaded_count();
    egui::Area::new(egui::Id::new("uploads"))
        .anchor(Align2::RIGHT_TOP, [-28.0, 28.0])
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                if uploaded > 0
                    && ui
                        .button(RichText::new(format!("Clear Uploads ({uploaded})")).color(MUTED))
                        .clicked()
                {
                    actions.push(UiAction::ClearUploads);
                }
                if ui
                    .button(RichText::new("Upload Photos").color(GOLD))
                    .clicked()
                {
                    actions.push(UiAction::Upload);
                }
            });
        });
}

fn instructions(ctx: &egui::Context) {
    egui::Area::new(egui::Id::new("instructions"))
        .anchor(Align2::CENTER_BOTTOM, [0.0, -28.0])
        .interactable(false)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                let hint = |ui: &mut egui::Ui, dot: Color32, text: &str| {
                    ui.label(RichText::new("●").color(dot));
                    ui.label(RichText::new(text).size(13.0).color(MUTED));
                };
                hint(ui, EMERALD, "Hold to Form Tree");
                ui.separator();
                hint(ui, Color32::from_rgb(220, 60, 60), "Release to Scatter");
                ui.separator();
                hint(ui, GOLD, "Click Photo to Wish");
            });
        });
}

fn memory_card(
    ctx: &egui::Context,
    selection: &Selection,
    state: &mut OverlayState,
    actions: &mut Vec<UiAction>,
) {
    let memory = selection.memory();
    let title = if memory.is_some() {
        "✨ A Holiday Memory"
    } else {
        "📷 Capture the Moment"
    };

    egui::Window::new(title)
        .id(egui::Id::new("memory-card"))
        .title_bar(false)
        .collapsible(false)
        .resizable(false)
        .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
        .default_width(400.0)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new(title).size(22.0).color(GOLD));
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    if ui.button("✕").clicked() {
                        actions.push(UiAction::Dismiss);
                    }
                });
            });
            ui.add_space(10.0);

            let status = selection.selected().map(|s| &s.status);
            match (status, memory) {
                (_, Some(text)) => {
                    ui.label(RichText::new(format!("\"{text}\"")).size(16.0).italics());
                    ui.add_space(12.0);
                    if ui.button("Cherish this Memory").clicked() {
                        actions.push(UiAction::Dismiss);
                    }
                }
                (Some(MemoryStatus::Loading(_)), None) => {
                    ui.vertical_centered(|ui| {
                        ui.spinner();
                        ui.label(
                            RichText::new("Listening to the whispers of Christmas elves...")
                                .italics()
                                .color(MUTED),
                        );
                    });
                }
                _ => {
                    ui.label(
                        RichText::new(
                            "What story lies within this photo? Write it down, and let \
                             Christmas magic weave an eternal memory for you.",
                        )
                        .color(MUTED),
                    );
                    ui.add_space(8.0);
                    let edit = ui.add(
                        egui::TextEdit::multiline(&mut state.draft)
                            .hint_text("e.g., This was taken during our ski trip to Hokkaido last year...")
                            .desired_rows(4)
                            .desired_width(f32::INFINITY),
                    );
                    if edit.changed() {
                        actions.push(UiAction::SetMessage(state.draft.clone()));
                    }
                    ui.add_space(8.0);
                    if ui
                        .button(RichText::new("✨ Generate Memory").color(GOLD))
                        .clicked()
                    {
                        actions.push(UiAction::Generate);
                    }
                }
            }
        });
}
