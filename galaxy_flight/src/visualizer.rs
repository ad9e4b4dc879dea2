//! Software-rendered viewer using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┬─────────────┐
//! │ mode banner                                          │ tracker     │
//! │                                                      │ status      │
//! │            galaxy (perspective point cloud)          │ [skeleton]  │
//! │                  ◯ hand cursors                      │ gesture     │
//! │  ╭──────╮                                            └─────────────┤
//! │  │ map  │                                                          │
//! │  ╰──────╯                                                          │
//! │ status bar                                                         │
//! │ key legend                                                         │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All drawing goes through [`Canvas`], which needs no window.

use std::time::Duration;

use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use flight_core::{CameraPose, RotationAccumulator, Vec3};
use hand_gesture::landmark::HAND_CONNECTIONS;
use hand_gesture::synth::HandPose;
use hand_gesture::{DebugStatus, Gesture, HandCursor, HandLandmarks, HandsView};

use crate::galaxy::{rotate_xy, Galaxy};
use crate::sensor::SimInput;
use crate::AppError;

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W:       usize = 1024;
pub const WIN_H:       usize = 640;
const STATUS_H:        usize = 36;
const STATUS_Y:        usize = WIN_H - STATUS_H;
const DEBUG_W:         usize = 160;
const DEBUG_H:         usize = 120;
const DEBUG_X:         usize = WIN_W - DEBUG_W - 12;
const DEBUG_Y:         usize = 24;
const MINIMAP_R:       i32   = 80;
const MINIMAP_CX:      i32   = MINIMAP_R + 14;
const MINIMAP_CY:      i32   = STATUS_Y as i32 - MINIMAP_R - 14;
const BG_COLOR:        u32   = 0xFF05050F;
const PANEL_BG:        u32   = 0xFF0F1428;
const TEXT_BG:         u32   = 0xFF0F3460;
const TEXT_COLOR:      u32   = 0xFFEEEEEE;
const DIM_TEXT:        u32   = 0xFF888888;
const ERROR_RED:       u32   = 0xFFFF3030;
const SKELETON_GREEN:  u32   = 0xFF00FF00;
const JOINT_RED:       u32   = 0xFFFF0000;
const BOUNCE_COLOR:    u32   = 0xFFFF6D00;

/// Nearer than this, a star shows its title.
const LABEL_DEPTH: f32 = 60.0;
const NEAR_PLANE:  f32 = 0.5;

// ════════════════════════════════════════════════════════════════════════════
// What to draw
// ════════════════════════════════════════════════════════════════════════════

/// Numbers for the status bar.
#[derive(Clone, Debug, PartialEq)]
pub struct Hud {
    pub gesture_mode:      bool,
    pub control:           &'static str,
    pub gesture:           Gesture,
    pub speed:             f32,
    pub fov:               f32,
    pub fly_speed:         f32,
    pub head_tracking:     bool,
    pub two_hand_rotation: bool,
    pub bouncing:          bool,
    pub distance:          f32,
    pub boundary:          f32,
}

/// One frame's worth of state, borrowed from the app.
pub struct Scene<'a> {
    pub galaxy:          &'a Galaxy,
    /// Gesture-driven point-cloud rotation.
    pub galaxy_rotation: RotationAccumulator,
    pub camera:          &'a CameraPose,
    pub hands:           &'a HandsView,
    pub debug:           &'a DebugStatus,
    pub hud:             Hud,
}

/// Cursor colour (`0xRRGGBB`) and diameter in pixels for a gesture.
pub fn cursor_style(gesture: Gesture) -> (u32, f32) {
    match gesture {
        Gesture::Grab       => (0xFF4444, 60.0),
        Gesture::PalmOpen   => (0x44FF44, 80.0),
        Gesture::Pinch      => (0x4444FF, 50.0),
        Gesture::Victory    => (0xFF44FF, 70.0),
        Gesture::PinchScale => (0xFFAA00, 90.0),
        _                   => (0x00FFFF, 40.0),
    }
}

/// Detector coordinates to screen pixels, mirrored so the user sees
/// their hand move the way it really moves.
pub fn mirrored_to_screen(p: (f32, f32), x0: f32, y0: f32, w: f32, h: f32) -> (f32, f32) {
    (x0 + (1.0 - p.0) * w, y0 + p.1 * h)
}

/// How far outside the unit square a detector point may sit and still be
/// drawn.  Anything further is garbage and is skipped.
const FRAME_MARGIN: f32 = 0.5;

pub fn drawable(p: (f32, f32)) -> bool {
    let ok = |v: f32| v.is_finite() && (-FRAME_MARGIN..=1.0 + FRAME_MARGIN).contains(&v);
    ok(p.0) && ok(p.1)
}

// ════════════════════════════════════════════════════════════════════════════
// Perspective projection
// ════════════════════════════════════════════════════════════════════════════

pub struct Projector {
    origin:  Vec3,
    right:   Vec3,
    up:      Vec3,
    forward: Vec3,
    focal:   f32,
    cx:      f32,
    cy:      f32,
}

impl Projector {
    pub fn new(camera: &CameraPose, width: usize, height: usize) -> Self {
        let r = camera.rotation;
        let half_fov = camera.fov.to_radians() * 0.5;
        Projector {
            origin:  camera.position,
            right:   r.right(),
            up:      r.up(),
            forward: r.forward(),
            focal:   (height as f32 * 0.5) / half_fov.tan(),
            cx:      width as f32 * 0.5,
            cy:      height as f32 * 0.5,
        }
    }

    /// Screen position and depth, or `None` behind the near plane.
    pub fn project(&self, p: Vec3) -> Option<(f32, f32, f32)> {
        let rel = p - self.origin;
        let depth = rel.dot(self.forward);
        if depth < NEAR_PLANE {
            return None;
        }
        let s = self.focal / depth;
        Some((self.cx + rel.dot(self.right) * s, self.cy - rel.dot(self.up) * s, depth))
    }

    /// Pixels per world unit at `depth`.
    pub fn scale_at(&self, depth: f32) -> f32 {
        self.focal / depth
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Canvas
// ════════════════════════════════════════════════════════════════════════════

pub struct Canvas {
    pub buf: Vec<u32>,
    pub w:   usize,
    pub h:   usize,
}

impl Canvas {
    pub fn new(w: usize, h: usize) -> Self {
        Canvas { buf: vec![BG_COLOR; w * h], w, h }
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.w && y < self.h).then(|| self.buf[y * self.w + x])
    }

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(self.h) {
            for col in x..(x + w).min(self.w) {
                self.buf[row * self.w + col] = color;
            }
        }
    }

    fn draw_border(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        if w == 0 || h == 0 {
            return;
        }
        for col in x..(x + w).min(self.w) {
            self.set_pixel(col, y, color);
            self.set_pixel(col, y + h - 1, color);
        }
        for row in y..(y + h).min(self.h) {
            self.set_pixel(x, row, color);
            self.set_pixel(x + w - 1, row, color);
        }
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < self.w && y < self.h {
            self.buf[y * self.w + x] = color;
        }
    }

    fn plot(&mut self, x: i32, y: i32, color: u32) {
        if x >= 0 && y >= 0 {
            self.set_pixel(x as usize, y as usize, color);
        }
    }

    /// Bresenham.  Lines with an endpoint far off the canvas are skipped.
    fn draw_line(&mut self, (x0, y0): (i32, i32), (x1, y1): (i32, i32), color: u32) {
        let (mx, my) = (2 * self.w as i64, 2 * self.h as i64);
        let near = |x: i32, y: i32| (-mx..=2 * mx).contains(&(x as i64)) && (-my..=2 * my).contains(&(y as i64));
        if !(near(x0, y0) && near(x1, y1)) {
            return;
        }
        let (dx, dy) = ((x1 - x0).abs(), -(y1 - y0).abs());
        let (sx, sy) = (if x0 < x1 { 1 } else { -1 }, if y0 < y1 { 1 } else { -1 });
        let (mut x, mut y, mut err) = (x0, y0, dx + dy);
        loop {
            self.plot(x, y, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    fn fill_disc(&mut self, cx: i32, cy: i32, r: i32, color: u32) {
        for dy in -r..=r {
            let half = ((r * r - dy * dy) as f32).sqrt() as i32;
            for dx in -half..=half {
                self.plot(cx + dx, cy + dy, color);
            }
        }
    }

    fn draw_circle(&mut self, cx: i32, cy: i32, r: i32, color: u32) {
        let steps = (r * 8).max(16);
        for i in 0..steps {
            let a = i as f32 / steps as f32 * std::f32::consts::TAU;
            let (s, c) = a.sin_cos();
            self.plot(cx + (c * r as f32).round() as i32, cy + (s * r as f32).round() as i32, color);
        }
    }

    /// Minimal bitmap font, 3×5 glyphs on a 4 px advance.
    fn draw_label(&mut self, text: &str, x: usize, y: usize, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            if cx + 4 > self.w {
                break;
            }
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.set_pixel(cx + col, y + row, color);
                    }
                }
            }
            cx += 4;
        }
    }
}

fn label_width(text: &str) -> usize {
    text.chars().count() * 4
}

// ════════════════════════════════════════════════════════════════════════════
// Scene drawing
// ════════════════════════════════════════════════════════════════════════════

pub fn draw_scene(c: &mut Canvas, scene: &Scene<'_>) {
    c.buf.fill(BG_COLOR);
    draw_galaxy(c, scene);
    if scene.hud.gesture_mode {
        draw_cursor(c, &scene.hands.left);
        draw_cursor(c, &scene.hands.right);
        draw_debug_overlay(c, scene.debug);
    }
    draw_minimap(c, scene);
    draw_banner(c, &scene.hud);
    draw_status_bar(c, &scene.hud);
}

/// Total rotation of the point cloud: gesture drag plus idle spin.
fn world_position(scene: &Scene<'_>, p: Vec3) -> Vec3 {
    rotate_xy(p, scene.galaxy_rotation.x, scene.galaxy_rotation.y + scene.galaxy.spin())
}

struct Splat<'a> {
    x:     f32,
    y:     f32,
    depth: f32,
    r:     f32,
    color: u32,
    title: Option<&'a str>,
}

fn draw_galaxy(c: &mut Canvas, scene: &Scene<'_>) {
    let proj = Projector::new(scene.camera, c.w, c.h);
    let (w, h) = (c.w as f32, c.h as f32);

    let mut splats: Vec<Splat<'_>> = scene
        .galaxy
        .points()
        .iter()
        .filter_map(|p| {
            let (x, y, depth) = proj.project(world_position(scene, p.position))?;
            let r = (p.size * 0.25 * proj.scale_at(depth)).clamp(1.0, 12.0);
            (x > -r && y > -r && x < w + r && y < h + r).then_some(Splat {
                x, y, depth, r,
                color: p.color,
                title: p.title.as_deref(),
            })
        })
        .collect();
    // Painter's order.
    splats.sort_by(|a, b| b.depth.total_cmp(&a.depth));

    for s in &splats {
        let fog = (s.depth / 800.0).min(0.75);
        let color = blend(0xFF000000 | s.color, BG_COLOR, fog);
        c.fill_disc(s.x as i32, s.y as i32, s.r as i32, color);
        if s.depth < LABEL_DEPTH {
            if let Some(title) = s.title {
                c.draw_label(title, s.x as usize + s.r as usize + 3, s.y as usize, TEXT_COLOR);
            }
        }
    }
}

fn draw_cursor(c: &mut Canvas, cursor: &HandCursor) {
    if !cursor.visible || !drawable(cursor.position) {
        return;
    }
    let (rgb, size) = cursor_style(cursor.gesture);
    let color = 0xFF000000 | rgb;
    let (x, y) = mirrored_to_screen(cursor.position, 0.0, 0.0, c.w as f32, c.h as f32);
    let r = (size * 0.5) as i32;
    c.draw_circle(x as i32, y as i32, r, color);
    c.draw_circle(x as i32, y as i32, r - 1, color);
    c.fill_disc(x as i32, y as i32, 2, color);

    let name = cursor.gesture.as_str();
    c.draw_label(name, (x as usize).saturating_sub(label_width(name) / 2), y as usize + r as usize + 4, color);
}

fn draw_debug_overlay(c: &mut Canvas, debug: &DebugStatus) {
    let status_color = if debug.status.contains("Error") { ERROR_RED } else { TEXT_COLOR };
    let sx = (DEBUG_X + DEBUG_W).saturating_sub(label_width(&debug.status));
    c.draw_label(&debug.status, sx, DEBUG_Y - 12, status_color);

    c.fill_rect(DEBUG_X, DEBUG_Y, DEBUG_W, DEBUG_H, PANEL_BG);
    c.draw_border(DEBUG_X, DEBUG_Y, DEBUG_W, DEBUG_H, DIM_TEXT);
    for hand in [&debug.left_hand, &debug.right_hand].into_iter().flatten() {
        draw_skeleton(c, hand);
    }

    let text = format!("Gesture: {}", debug.gesture);
    c.draw_label(&text, DEBUG_X + 4, DEBUG_Y + DEBUG_H + 6, TEXT_COLOR);
}

fn draw_skeleton(c: &mut Canvas, hand: &HandLandmarks) {
    let to_panel = |i: usize| {
        hand.point(i).filter(|p| drawable(p.xy())).map(|p| {
            let (x, y) = mirrored_to_screen(p.xy(), DEBUG_X as f32, DEBUG_Y as f32, DEBUG_W as f32, DEBUG_H as f32);
            (x as i32, y as i32)
        })
    };
    for &(a, b) in HAND_CONNECTIONS.iter() {
        if let (Some(pa), Some(pb)) = (to_panel(a), to_panel(b)) {
            c.draw_line(pa, pb, SKELETON_GREEN);
        }
    }
    for i in 0..hand.len() {
        if let Some((x, y)) = to_panel(i) {
            c.fill_disc(x, y, 1, JOINT_RED);
        }
    }
}

fn draw_minimap(c: &mut Canvas, scene: &Scene<'_>) {
    let scale = MINIMAP_R as f32 / (scene.hud.boundary * 1.15);
    let to_map = |v: Vec3| {
        (MINIMAP_CX + (v.x * scale).round() as i32, MINIMAP_CY + (v.z * scale).round() as i32)
    };

    c.fill_disc(MINIMAP_CX, MINIMAP_CY, MINIMAP_R, PANEL_BG);
    c.draw_circle(MINIMAP_CX, MINIMAP_CY, MINIMAP_R, DIM_TEXT);
    let boundary_r = (scene.hud.boundary * scale).round() as i32;
    let boundary_color = if scene.hud.bouncing { BOUNCE_COLOR } else { 0xFF444466 };
    c.draw_circle(MINIMAP_CX, MINIMAP_CY, boundary_r, boundary_color);

    for p in scene.galaxy.points() {
        let (x, y) = to_map(world_position(scene, p.position));
        c.plot(x, y, 0xFF000000 | p.color);
    }

    // Camera marker, pinned to the rim when it is off the map.
    let mut pos = scene.camera.position;
    let flat = (pos.x * pos.x + pos.z * pos.z).sqrt() * scale;
    let limit = (MINIMAP_R - 6) as f32;
    if flat > limit {
        let k = limit / flat;
        pos = Vec3::new(pos.x * k, 0.0, pos.z * k);
    }
    let (mx, my) = to_map(pos);
    let fwd = scene.camera.rotation.forward();
    let len = (fwd.x * fwd.x + fwd.z * fwd.z).sqrt();
    let (dx, dy) = if len > 1e-4 { (fwd.x / len, fwd.z / len) } else { (0.0, -1.0) };
    let at = |along: f32, across: f32| {
        (mx + (dx * along - dy * across).round() as i32, my + (dy * along + dx * across).round() as i32)
    };
    let (tip, left, right) = (at(8.0, 0.0), at(-4.0, 4.0), at(-4.0, -4.0));
    let marker = if scene.hud.bouncing { BOUNCE_COLOR } else { 0xFFFFFFFF };
    c.draw_line(tip, left, marker);
    c.draw_line(left, right, marker);
    c.draw_line(right, tip, marker);
}

fn draw_banner(c: &mut Canvas, hud: &Hud) {
    let text = if hud.gesture_mode {
        format!("GESTURE FLIGHT  {}  fist=fly  victory=reverse  two hands=zoom", hud.control)
    } else {
        "ORBIT  drag=rotate  scroll=zoom  G=gesture control".to_string()
    };
    c.draw_label(&text, 10, 10, TEXT_COLOR);
}

fn draw_status_bar(c: &mut Canvas, hud: &Hud) {
    c.fill_rect(0, STATUS_Y, c.w, STATUS_H, TEXT_BG);
    let on = |b: bool| if b { "on" } else { "off" };
    let status = format!(
        "{}  speed {:.0}  fov {:.1}  fly {:.0}  steer {}  drag {}  dist {:.0}/{:.0}{}",
        hud.gesture, hud.speed, hud.fov, hud.fly_speed,
        on(hud.head_tracking), on(hud.two_hand_rotation),
        hud.distance, hud.boundary,
        if hud.bouncing { "  bounce" } else { "" },
    );
    c.draw_label(&status, 10, STATUS_Y + 8, TEXT_COLOR);
    c.draw_label(
        "G=gestures  K=steer  T=drag  [ ]=speed  R=reset  1-5,0=pose  H=2nd hand  N=hide  Q=quit",
        10, STATUS_Y + 22, DIM_TEXT,
    );
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer (window + input)
// ════════════════════════════════════════════════════════════════════════════

/// What the user asked for this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UiCommand {
    Quit,
    ToggleGestureMode,
    ToggleHeadTracking,
    ToggleTwoHandRotation,
    FlySpeed(f32),
    ResetCamera,
    OrbitDrag { dx: f32, dy: f32 },
    OrbitZoom(f32),
    Sim(SimInput),
}

const POSE_KEYS: [(Key, HandPose); 6] = [
    (Key::Key1, HandPose::OpenPalm),
    (Key::Key2, HandPose::Fist),
    (Key::Key3, HandPose::Victory),
    (Key::Key4, HandPose::Point),
    (Key::Key5, HandPose::Pinch),
    (Key::Key0, HandPose::Relaxed),
];

pub struct Visualizer {
    window:     Window,
    canvas:     Canvas,
    last_mouse: Option<(f32, f32)>,
}

impl Visualizer {
    pub fn new() -> Result<Self, AppError> {
        let mut window = Window::new(
            "Neural Galaxy — gesture flight",
            WIN_W, WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )
        .map_err(|e| AppError::Window(e.to_string()))?;

        window.limit_update_rate(Some(Duration::from_millis(16))); // ~60fps

        Ok(Visualizer { window, canvas: Canvas::new(WIN_W, WIN_H), last_mouse: None })
    }

    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Poll keyboard and mouse.
    pub fn poll_input(&mut self) -> Vec<UiCommand> {
        let mut cmds = Vec::new();
        if !self.window.is_open() {
            cmds.push(UiCommand::Quit);
            return cmds;
        }

        let window = &self.window;
        let one_shot = |k: Key| window.is_key_pressed(k, KeyRepeat::No);
        let held     = |k: Key| window.is_key_pressed(k, KeyRepeat::Yes);

        if one_shot(Key::Q) || one_shot(Key::Escape) {
            cmds.push(UiCommand::Quit);
            return cmds;
        }
        if one_shot(Key::G) { cmds.push(UiCommand::ToggleGestureMode); }
        if one_shot(Key::K) { cmds.push(UiCommand::ToggleHeadTracking); }
        if one_shot(Key::T) { cmds.push(UiCommand::ToggleTwoHandRotation); }
        if one_shot(Key::R) { cmds.push(UiCommand::ResetCamera); }
        if held(Key::LeftBracket)  { cmds.push(UiCommand::FlySpeed(-10.0)); }
        if held(Key::RightBracket) { cmds.push(UiCommand::FlySpeed(10.0)); }

        for (key, pose) in POSE_KEYS {
            if one_shot(key) {
                cmds.push(UiCommand::Sim(SimInput::Pose(pose)));
            }
        }
        if one_shot(Key::H) { cmds.push(UiCommand::Sim(SimInput::ToggleSecondHand)); }
        if one_shot(Key::N) { cmds.push(UiCommand::Sim(SimInput::ToggleHidden)); }

        if let Some((mx, my)) = window.get_mouse_pos(MouseMode::Discard) {
            if let Some((lx, ly)) = self.last_mouse {
                if (lx, ly) != (mx, my) {
                    cmds.push(UiCommand::Sim(SimInput::Move(mx / WIN_W as f32, my / WIN_H as f32)));
                    if window.get_mouse_down(MouseButton::Left) {
                        cmds.push(UiCommand::OrbitDrag { dx: mx - lx, dy: my - ly });
                    }
                }
            }
            self.last_mouse = Some((mx, my));
        }
        if let Some((_, scroll)) = window.get_scroll_wheel() {
            if scroll != 0.0 {
                cmds.push(UiCommand::OrbitZoom(scroll.signum()));
            }
        }

        cmds
    }

    /// Render one frame.
    pub fn render(&mut self, scene: &Scene<'_>) {
        draw_scene(&mut self.canvas, scene);
        self.window.update_with_buffer(&self.canvas.buf, WIN_W, WIN_H).ok();
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '_' => [0b000, 0b000, 0b000, 0b000, 0b111],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '(' => [0b010, 0b100, 0b100, 0b100, 0b010],
        ')' => [0b010, 0b001, 0b001, 0b001, 0b010],
        '[' => [0b110, 0b100, 0b100, 0b100, 0b110],
        ']' => [0b011, 0b001, 0b001, 0b001, 0b011],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        '?' => [0b111, 0b001, 0b010, 0b000, 0b010],
        '%' => [0b101, 0b001, 0b010, 0b100, 0b101],
        '\'' => [0b010, 0b010, 0b000, 0b000, 0b000],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

/// Alpha-blend two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0 - t) + cb as f32 * t) as u32;
    let ar = (a >> 16) & 0xFF; let br = (b >> 16) & 0xFF;
    let ag = (a >>  8) & 0xFF; let bg = (b >>  8) & 0xFF;
    let ab =  a        & 0xFF; let bb =  b        & 0xFF;
    0xFF000000 | (lerp(ar, br) << 16) | (lerp(ag, bg) << 8) | lerp(ab, bb)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
