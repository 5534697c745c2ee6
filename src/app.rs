//! Main application state and UI.

use crate::api::ApiClient;
use crate::graph::types::ClassificationResult;
use crate::graph::{Viewer, CANVAS_CENTER, CANVAS_SIZE};
use crate::settings::Settings;
use crate::theme;
use eframe::egui::{self, Pos2, Stroke, Vec2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::Instant;
use tracing::{info, warn};

/// The only failure text users ever see
pub const CLASSIFY_ERROR: &str = "Failed to classify the wallet. Please try again.";

/// Extra pick radius around node markers, in screen pixels
const PICK_SLOP: f32 = 3.0;

type ClassifyOutcome = anyhow::Result<ClassificationResult>;

/// `0x` followed by exactly 40 hex digits
pub fn is_valid_wallet_address(address: &str) -> bool {
    address
        .strip_prefix("0x")
        .is_some_and(|hex| hex.len() == 40 && hex.bytes().all(|b| b.is_ascii_hexdigit()))
}

pub struct FraudCheckerApp {
    api: ApiClient,

    // Form and result
    address: String,
    result: Option<ClassificationResult>,
    error: Option<String>,
    pending: Option<Receiver<ClassifyOutcome>>,

    // Graph
    viewer: Viewer,
    rng: StdRng,

    // Viewport state
    pan_offset: Vec2,
    zoom: f32,
    panning: bool,
    /// Node center minus press position for the node being dragged
    grab_offset: Vec2,

    // Settings persistence
    settings: Settings,
    settings_dirty: bool,
    last_settings_save: Instant,
}

impl FraudCheckerApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, settings: Settings) -> Self {
        Self::with_settings(settings)
    }

    pub fn with_settings(settings: Settings) -> Self {
        let viewer = Viewer::new(settings.simulation_config(), settings.node_radius);

        Self {
            api: ApiClient::new(settings.api_base_url.clone()),
            address: String::new(),
            result: None,
            error: None,
            pending: None,
            viewer,
            rng: StdRng::from_entropy(),
            pan_offset: Vec2::ZERO,
            zoom: 1.0,
            panning: false,
            grab_offset: Vec2::ZERO,
            settings,
            settings_dirty: false,
            last_settings_save: Instant::now(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn can_submit(&self) -> bool {
        !self.is_pending() && is_valid_wallet_address(self.address.trim())
    }

    /// Start a classification for the address in the form.
    /// Returns false when the form state does not allow submitting.
    pub fn submit(&mut self) -> bool {
        if !self.can_submit() {
            return false;
        }
        let address = self.address.trim().to_string();
        self.reset_result();
        self.begin_request(address);
        true
    }

    /// Forget the displayed result, error and graph
    fn reset_result(&mut self) {
        self.result = None;
        self.error = None;
        self.viewer.clear();
    }

    fn begin_request(&mut self, address: String) {
        let (tx, rx) = mpsc::channel();
        // Replacing the receiver drops any earlier in-flight request's channel
        self.pending = Some(rx);

        let api = self.api.clone();
        let model = self.settings.model_name.clone();
        std::thread::spawn(move || {
            let outcome = api.classify(&address, &model);
            let _ = tx.send(outcome);
        });
    }

    /// Check for a finished request. Returns true while one is still in flight.
    fn poll_pending(&mut self) -> bool {
        let Some(rx) = &self.pending else {
            return false;
        };
        match rx.try_recv() {
            Ok(outcome) => {
                self.apply_result(outcome);
                false
            }
            Err(TryRecvError::Empty) => true,
            Err(TryRecvError::Disconnected) => {
                warn!("classification worker exited without a result");
                self.pending = None;
                self.fail();
                false
            }
        }
    }

    fn apply_result(&mut self, outcome: ClassifyOutcome) {
        self.pending = None;

        let result = match outcome {
            Ok(result) => result,
            Err(e) => {
                warn!("classification failed: {e:#}");
                self.fail();
                return;
            }
        };

        match self.viewer.show(&result.graph, &mut self.rng) {
            Ok(()) => {
                info!(
                    probability = %result.probability_label(),
                    nodes = result.graph.nodes.len(),
                    "classification received"
                );
                self.error = None;
                self.result = Some(result);
                self.reset_view();
            }
            Err(e) => {
                warn!("rejected classification graph: {e}");
                self.fail();
            }
        }
    }

    fn fail(&mut self) {
        self.result = None;
        self.viewer.clear();
        self.error = Some(CLASSIFY_ERROR.to_string());
    }

    fn reset_view(&mut self) {
        self.pan_offset = Vec2::ZERO;
        self.zoom = 1.0;
    }

    /// Mark settings as needing to be saved
    fn mark_settings_dirty(&mut self) {
        self.settings_dirty = true;
    }

    /// Push physics settings into the live layout
    fn apply_physics(&mut self) {
        self.viewer.set_config(self.settings.simulation_config());
        self.mark_settings_dirty();
    }

    /// Save settings if dirty and enough time has passed (debounce)
    fn maybe_save_settings(&mut self) {
        if self.settings_dirty && self.last_settings_save.elapsed().as_secs() >= 2 {
            self.settings.save();
            self.settings_dirty = false;
            self.last_settings_save = Instant::now();
        }
    }

    fn render_header(&self, ui: &mut egui::Ui) {
        ui.add_space(6.0);
        ui.heading("Ethereum Fraud Checker");
        if let Some(result) = &self.result {
            ui.label(
                egui::RichText::new(format!("Fraud Probability: {}", result.probability_label()))
                    .size(16.0)
                    .color(theme::text::PRIMARY),
            );
        }
        ui.add_space(6.0);
    }

    fn render_form(&mut self, ui: &mut egui::Ui) {
        ui.add_space(6.0);
        ui.horizontal(|ui| {
            let edit = ui.add(
                egui::TextEdit::singleline(&mut self.address)
                    .hint_text("0x…")
                    .desired_width(420.0)
                    .font(egui::TextStyle::Monospace),
            );
            let enter = edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

            let clicked = ui
                .add_enabled(self.can_submit(), egui::Button::new("Check Wallet"))
                .clicked();
            if clicked || enter {
                self.submit();
            }

            if self.is_pending() {
                ui.spinner();
            }
        });

        ui.colored_label(
            theme::text::MUTED,
            "Enter an Ethereum wallet address (0x followed by 40 hex characters) to check it for fraud.",
        );
        if let Some(err) = &self.error {
            ui.colored_label(theme::text::ERROR, err);
        }
        ui.add_space(6.0);
    }

    fn render_controls(&mut self, ui: &mut egui::Ui) {
        egui::CollapsingHeader::new("Physics")
            .default_open(true)
            .show(ui, |ui| {
                let mut changed = false;
                changed |= ui
                    .add(egui::Slider::new(&mut self.settings.charge_strength, -1000.0..=0.0).text("Charge"))
                    .changed();
                changed |= ui
                    .add(egui::Slider::new(&mut self.settings.link_distance, 10.0..=400.0).text("Link distance"))
                    .changed();
                changed |= ui
                    .add(
                        egui::Slider::new(&mut self.settings.velocity_decay, 0.05..=0.9)
                            .text("Velocity decay")
                            .fixed_decimals(2),
                    )
                    .changed();
                if changed {
                    self.apply_physics();
                }

                if ui.button("Reheat").clicked() {
                    self.viewer.reheat();
                }

                if let Some(phase) = self.viewer.phase() {
                    ui.label(format!("Phase: {phase:?}"));
                }
                if let Some(session) = self.viewer.session() {
                    let sim = session.simulation();
                    ui.label(format!("Alpha: {:.3} -> {:.1}", sim.alpha(), sim.alpha_target()));
                }
            });

        egui::CollapsingHeader::new("Display")
            .default_open(true)
            .show(ui, |ui| {
                if ui
                    .add(egui::Slider::new(&mut self.settings.node_radius, 4.0..=24.0).text("Node radius"))
                    .changed()
                {
                    self.viewer.set_node_radius(self.settings.node_radius);
                    self.mark_settings_dirty();
                }
                if ui.checkbox(&mut self.settings.show_edge_labels, "Edge labels").changed() {
                    self.mark_settings_dirty();
                }
                if ui.button("Reset view").clicked() {
                    self.reset_view();
                }
            });
    }

    fn render_canvas(&mut self, ui: &mut egui::Ui) {
        let (response, painter) = ui.allocate_painter(CANVAS_SIZE, egui::Sense::click_and_drag());
        let rect = response.rect;
        let center = rect.center();

        let scroll_delta = ui.input(|i| i.smooth_scroll_delta);
        let zoom_delta = ui.input(|i| i.zoom_delta());

        // Scroll and pinch zoom toward the cursor
        if let Some(cursor_pos) = response.hover_pos() {
            let factor = zoom_delta * (scroll_delta.y * 0.0015).exp();
            if factor != 1.0 {
                let new_zoom = (self.zoom * factor).clamp(0.1, 8.0);
                let cursor_offset = cursor_pos - center - self.pan_offset;
                self.pan_offset += cursor_offset * (1.0 - new_zoom / self.zoom);
                self.zoom = new_zoom;
            }
        }

        let pan_offset = self.pan_offset;
        let zoom = self.zoom;

        // Graph space <-> screen space
        let to_screen = |pos: Pos2| -> Pos2 { center + (pos - CANVAS_CENTER) * zoom + pan_offset };
        let to_graph = |pos: Pos2| -> Pos2 { CANVAS_CENTER + (pos - center - pan_offset) / zoom };

        let pointer = response.interact_pointer_pos().map(to_graph);
        let slop = PICK_SLOP / zoom;

        if response.drag_started_by(egui::PointerButton::Primary) {
            // Hit-test where the button went down, not where the drag threshold was crossed
            let origin = ui.input(|i| i.pointer.press_origin()).map(to_graph);
            match origin.and_then(|o| self.viewer.grab(o, slop).map(|hit| (o, hit))) {
                Some((origin, (node, offset))) => {
                    self.grab_offset = offset;
                    self.viewer.drag_start(node, pointer.unwrap_or(origin) + offset);
                }
                None => self.panning = true,
            }
        }

        if response.dragged_by(egui::PointerButton::Primary) {
            if self.viewer.dragged_node().is_some() {
                if let Some(p) = pointer {
                    self.viewer.drag_to(p + self.grab_offset);
                }
            } else if self.panning {
                self.pan_offset += response.drag_delta();
            }
        }

        if response.drag_stopped() {
            self.viewer.drag_end();
            self.panning = false;
            self.grab_offset = Vec2::ZERO;
        }

        let hovered = response
            .hover_pos()
            .and_then(|p| self.viewer.node_at(to_graph(p), slop));
        if self.viewer.dragged_node().is_some() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::Grabbing);
        } else if hovered.is_some() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::Grab);
        }

        painter.rect_stroke(rect, 0.0, Stroke::new(1.0, theme::bg::CANVAS_BORDER));

        let scene = self.viewer.scene();

        // Draw edges first (behind nodes)
        let edge_stroke = Stroke::new(theme::graph::EDGE_WIDTH * zoom, theme::graph::edge_color());
        for line in scene.lines() {
            painter.line_segment([to_screen(line.from), to_screen(line.to)], edge_stroke);
        }

        if self.settings.show_edge_labels {
            let font = theme::canvas_font(theme::graph::EDGE_LABEL_SIZE, zoom);
            for label in scene.edge_labels() {
                painter.text(
                    to_screen(label.anchor),
                    egui::Align2::CENTER_CENTER,
                    &label.text,
                    font.clone(),
                    theme::graph::EDGE_LABEL,
                );
            }
        }

        let radius = scene.node_radius() * zoom;
        let dragged = self.viewer.dragged_node();
        for marker in scene.markers() {
            let pos = to_screen(marker.center);
            painter.circle_filled(pos, radius, theme::graph::NODE_FILL);
            let outline = if dragged == Some(marker.index) {
                theme::graph::NODE_DRAGGED
            } else {
                theme::graph::NODE_STROKE
            };
            painter.circle_stroke(pos, radius, Stroke::new(theme::graph::NODE_STROKE_WIDTH, outline));
        }

        let font = theme::canvas_font(theme::graph::NODE_LABEL_SIZE, zoom);
        for label in scene.node_labels() {
            let above = to_screen(label.anchor) - Vec2::new(0.0, radius + theme::graph::LABEL_GAP);
            painter.text(
                above,
                egui::Align2::CENTER_BOTTOM,
                &label.text,
                font.clone(),
                theme::graph::NODE_LABEL,
            );
        }

        // Status text
        if scene.is_empty() {
            let text = if self.is_pending() {
                "Classifying..."
            } else if self.viewer.has_graph() {
                "No transactions to display"
            } else {
                "Enter a wallet address below"
            };
            painter.text(
                center,
                egui::Align2::CENTER_CENTER,
                text,
                egui::FontId::proportional(20.0),
                theme::text::MUTED,
            );
        }
    }
}

impl eframe::App for FraudCheckerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.maybe_save_settings();

        let waiting = self.poll_pending();
        let animating = self.viewer.frame();
        if waiting || animating || self.viewer.needs_tick() {
            ctx.request_repaint();
        }

        // Dark theme
        ctx.set_visuals(egui::Visuals::dark());

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            self.render_header(ui);
        });

        egui::TopBottomPanel::bottom("form")
            .frame(
                egui::Frame::none()
                    .fill(theme::bg::PANEL)
                    .inner_margin(egui::Margin::symmetric(12.0, 8.0)),
            )
            .show(ctx, |ui| {
                self.render_form(ui);
            });

        egui::SidePanel::right("controls")
            .min_width(220.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.render_controls(ui);
                });
            });

        // Main graph area
        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(theme::bg::GRAPH))
            .show(ctx, |ui| {
                self.render_canvas(ui);
            });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        // Force save settings on exit
        if self.settings_dirty {
            self.settings.save();
        }
    }
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod tests;
