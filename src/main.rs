use eframe::egui;
use eframe::egui::{Color32, Stroke, TextureHandle, TextureOptions};

use rusty_pixels::app::tools::Tool;
use rusty_pixels::selection::transform::FloatTransform;
use rusty_pixels::utils::color::Color;
use rusty_pixels::utils::exporter::ExportFormat;
use rusty_pixels::utils::geometry::Vec2;
use rusty_pixels::utils::profiler::ScopeTimer;
use rusty_pixels::{Editor, EngineSettings, Project};

/// egui shell around an [`Editor`]: shows the composed viewport and forwards input.
struct ViewerApp {
    editor: Editor,
    texture: Option<TextureHandle>,
    clipboard: Vec<(i32, i32, Color)>,
    status: String,
}

impl ViewerApp {
    fn new(settings: EngineSettings) -> Self {
        Self {
            editor: Editor::new(Project::new("Untitled"), settings),
            texture: None,
            clipboard: Vec::new(),
            status: String::new(),
        }
    }

    fn to_screen(&self, origin: egui::Pos2, world: Vec2) -> egui::Pos2 {
        let s = self.editor.camera.world_to_screen(world);
        origin + egui::vec2(s.x, s.y)
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            for tool in Tool::ALL {
                let selected = self.editor.tool.same_kind(&tool);
                if ui.selectable_label(selected, tool.label()).clicked() && !selected {
                    self.editor.tool = tool;
                }
            }
            if let Tool::Bucket { smart, diagonal } = &mut self.editor.tool {
                ui.checkbox(smart, "Smart");
                ui.checkbox(diagonal, "Diagonal");
            }
            if let Tool::MagicWand { diagonal, .. } = &mut self.editor.tool {
                ui.checkbox(diagonal, "Diagonal");
            }

            ui.separator();
            let mut color = self.editor.color.to_color32();
            if ui.color_edit_button_srgba(&mut color).changed() {
                self.editor.color = Color::from_color32(color);
            }

            ui.separator();
            if ui.button("New Layer").clicked() {
                let n = self.editor.project().frame().layers.len() + 1;
                self.editor.add_layer(format!("Layer {n}"));
            }
            if ui.button("Undo").clicked() {
                self.editor.undo();
            }
            if ui.button("Redo").clicked() {
                self.editor.redo();
            }
            if ui.button("Anchor").clicked() {
                self.editor.anchor();
            }
            if ui.button("Export").clicked() {
                self.export();
            }
        });
    }

    fn export(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .set_file_name("untitled.png")
            .save_file()
        else {
            return;
        };
        let format = ExportFormat::from_path(&path);
        self.status = match self.editor.export(&path, format) {
            Ok(()) => format!("Exported {}", path.display()),
            Err(err) => {
                log::error!("export failed: {err}");
                format!("Export failed: {err}")
            }
        };
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        let (undo, redo, copy, paste, anchor, flip_h, flip_v, rotate) = ctx.input(|i| {
            let cmd = i.modifiers.command;
            (
                cmd && !i.modifiers.shift && i.key_pressed(egui::Key::Z),
                cmd && (i.key_pressed(egui::Key::Y) || (i.modifiers.shift && i.key_pressed(egui::Key::Z))),
                cmd && i.key_pressed(egui::Key::C),
                cmd && i.key_pressed(egui::Key::V),
                i.key_pressed(egui::Key::Enter),
                !cmd && i.key_pressed(egui::Key::H),
                !cmd && i.key_pressed(egui::Key::V),
                !cmd && i.key_pressed(egui::Key::R),
            )
        });
        if undo {
            self.editor.undo();
        }
        if redo {
            self.editor.redo();
        }
        if copy {
            self.clipboard = self.editor.copy_selection();
        }
        if paste && !self.clipboard.is_empty() {
            self.editor.paste(self.clipboard.iter().copied(), None);
        }
        if anchor {
            self.editor.anchor();
        }
        if flip_h {
            self.editor.transform_floating(FloatTransform::FlipHorizontal);
        }
        if flip_v {
            self.editor.transform_floating(FloatTransform::FlipVertical);
        }
        if rotate {
            self.editor.transform_floating(FloatTransform::RotateCw);
        }
    }

    fn handle_pointer(&mut self, ui: &egui::Ui, rect: egui::Rect, response: &egui::Response) {
        let (hover, pressed, released, secondary, delta, scroll) = ui.input(|i| {
            (
                i.pointer.hover_pos(),
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.pointer.secondary_down(),
                i.pointer.delta(),
                i.raw_scroll_delta.y,
            )
        });

        if secondary && response.hovered() {
            self.editor.camera.pan_by(Vec2::new(delta.x, delta.y));
        }
        if let Some(pos) = hover {
            let local = Vec2::new(pos.x - rect.min.x, pos.y - rect.min.y);
            if scroll != 0.0 && response.hovered() {
                self.editor.camera.zoom_at(local, if scroll > 0.0 { 1.1 } else { 1.0 / 1.1 });
            }
            let cell = self.editor.camera.cell_at(local);
            if pressed && response.hovered() {
                self.editor.pointer_down(cell);
            } else if self.editor.is_interacting() {
                self.editor.pointer_move(cell);
            }
        }
        if released {
            self.editor.pointer_up();
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_keys(ctx);

        egui::TopBottomPanel::top("tools").show(ctx, |ui| self.toolbar(ui));
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(format!(
                    "layer {:?} | frame {} | zoom {:.0}x",
                    self.editor.active_layer(),
                    self.editor.project().active_frame,
                    self.editor.camera.zoom
                ));
                if let Some(sel) = self.editor.selection() {
                    ui.label(format!("{} selected", sel.len()));
                }
                ui.label(&self.status);
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let (rect, response) =
                ui.allocate_at_least(ui.available_size(), egui::Sense::click_and_drag());
            self.editor
                .set_viewport_size(Vec2::new(rect.width(), rect.height()));
            self.handle_pointer(ui, rect, &response);

            let viewport = self.editor.viewport();
            let image = self.editor.render();
            {
                let _timer = ScopeTimer::new("texture_set");
                match &mut self.texture {
                    Some(texture) => texture.set(image, TextureOptions::NEAREST),
                    None => {
                        self.texture =
                            Some(ctx.load_texture("viewport", image, TextureOptions::NEAREST));
                    }
                }
            }

            let painter = ui.painter_at(rect);
            painter.rect_filled(rect, 0.0, Color32::from_gray(40));
            if let Some(texture) = &self.texture {
                let min = self.to_screen(rect.min, Vec2::new(viewport.x as f32, viewport.y as f32));
                let max = self.to_screen(
                    rect.min,
                    Vec2::new(viewport.max_x() as f32, viewport.max_y() as f32),
                );
                painter.image(
                    texture.id(),
                    egui::Rect::from_min_max(min, max),
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    Color32::WHITE,
                );
            }

            if let Some(selection) = self.editor.selection() {
                let stroke = Stroke::new(1.0, Color32::WHITE);
                for seg in &selection.outline {
                    let a = self.to_screen(rect.min, Vec2::new(seg.from.0 as f32, seg.from.1 as f32));
                    let b = self.to_screen(rect.min, Vec2::new(seg.to.0 as f32, seg.to.1 as f32));
                    painter.line_segment([a, b], stroke);
                }
            }
            if let Some(buffer) = self.editor.floating() {
                let b = buffer.bounds();
                let min = self.to_screen(rect.min, Vec2::new(b.x as f32, b.y as f32));
                let max = self.to_screen(rect.min, Vec2::new(b.max_x() as f32, b.max_y() as f32));
                painter.rect_stroke(
                    egui::Rect::from_min_max(min, max),
                    0.0,
                    Stroke::new(1.0, Color32::YELLOW),
                );
            }
        });

        if self.editor.is_interacting() {
            ctx.request_repaint();
        }
    }
}

fn main() -> eframe::Result<()> {
    env_logger::init();

    let settings = EngineSettings::from_args(std::env::args().skip(1));
    log::info!("starting with {settings:?}");
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([800.0, 600.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Rusty Pixels",
        options,
        Box::new(move |_cc| Ok(Box::new(ViewerApp::new(settings)))),
    )
}
