use crate::config;
use crate::monitor::Monitor;
use crate::xwrapper::Window;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientHandle(pub x11::xlib::XID);

impl From<Window> for ClientHandle {
    fn from(w: Window) -> Self {
        ClientHandle(w.0)
    }
}

/// One managed top-level window.
#[derive(Debug, Clone)]
pub struct Client {
    pub name: String,
    pub min_aspect: f32,
    pub max_aspect: f32,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    pub oldx: i32,
    pub oldy: i32,
    pub oldw: i32,
    pub oldh: i32,
    pub base_width: i32,
    pub base_height: i32,
    pub width_inc: i32,
    pub height_inc: i32,
    pub max_width: i32,
    pub max_height: i32,
    pub min_width: i32,
    pub min_height: i32,
    pub bw: i32,
    pub old_bw: i32,
    pub tags: u32,
    pub is_fixed: bool,
    pub is_floating: bool,
    pub is_urgent: bool,
    pub never_focus: bool,
    pub old_state: bool,
    pub is_fullscreen: bool,
    pub monitor_idx: usize,
    pub win: Window,
}

/// Per-monitor facts a resize needs: screen and window-area geometry plus
/// what the active layout looks like. Snapshotted so the geometry pipeline
/// stays free of X calls.
#[derive(Debug, Clone, Copy)]
pub struct ResizeCtx {
    pub sw: i32,
    pub sh: i32,
    pub bh: i32,
    pub wx: i32,
    pub wy: i32,
    pub ww: i32,
    pub wh: i32,
    /// the selected layout has no arranger (floating mode)
    pub floating_layout: bool,
    /// the selected layout is monocle
    pub monocle: bool,
    /// number of tiled clients on the monitor
    pub ntiled: usize,
}

impl Client {
    pub fn new(win: Window, x: i32, y: i32, w: i32, h: i32, border_width: i32) -> Self {
        Client {
            name: String::new(),
            min_aspect: 0.0,
            max_aspect: 0.0,
            x,
            y,
            w,
            h,
            oldx: x,
            oldy: y,
            oldw: w,
            oldh: h,
            base_width: 0,
            base_height: 0,
            width_inc: 0,
            height_inc: 0,
            max_width: 0,
            max_height: 0,
            min_width: 0,
            min_height: 0,
            bw: config::BORDER_PX,
            old_bw: border_width,
            tags: 0,
            is_fixed: false,
            is_floating: false,
            is_urgent: false,
            never_focus: false,
            old_state: false,
            is_fullscreen: false,
            monitor_idx: 0,
            win,
        }
    }

    /// Outer width: frame plus border plus the inter-window gap.
    pub fn total_w(&self) -> i32 {
        self.w + 2 * self.bw + config::WINDOW_GAP
    }

    /// Outer height: frame plus border plus the inter-window gap.
    pub fn total_h(&self) -> i32 {
        self.h + 2 * self.bw + config::WINDOW_GAP
    }

    pub fn is_visible_on(&self, m: &Monitor) -> bool {
        (self.tags & m.tagset[m.seltags as usize]) != 0
    }

    /// Constrain a proposed geometry per ICCCM 4.1.2.3. Interactive resizes
    /// clamp against the whole screen, programmatic ones against the window
    /// area. Returns whether the result differs from the current geometry.
    pub fn apply_size_hints(
        &self,
        x: &mut i32,
        y: &mut i32,
        w: &mut i32,
        h: &mut i32,
        interact: bool,
        ctx: &ResizeCtx,
    ) -> bool {
        *w = (*w).max(1);
        *h = (*h).max(1);
        if interact {
            if *x > ctx.sw {
                *x = ctx.sw - self.total_w();
            }
            if *y > ctx.sh {
                *y = ctx.sh - self.total_h();
            }
            if *x + *w + 2 * self.bw < 0 {
                *x = 0;
            }
            if *y + *h + 2 * self.bw < 0 {
                *y = 0;
            }
        } else {
            if *x >= ctx.wx + ctx.ww {
                *x = ctx.wx + ctx.ww - self.total_w();
            }
            if *y >= ctx.wy + ctx.wh {
                *y = ctx.wy + ctx.wh - self.total_h();
            }
            if *x + *w + 2 * self.bw <= ctx.wx {
                *x = ctx.wx;
            }
            if *y + *h + 2 * self.bw <= ctx.wy {
                *y = ctx.wy;
            }
        }
        if *h < ctx.bh {
            *h = ctx.bh;
        }
        if *w < ctx.bh {
            *w = ctx.bh;
        }
        if config::RESIZE_HINTS || self.is_floating || ctx.floating_layout {
            // the last two sentences of ICCCM 4.1.2.3 make base==min special
            let base_is_min =
                self.base_width == self.min_width && self.base_height == self.min_height;
            if !base_is_min {
                *w -= self.base_width;
                *h -= self.base_height;
            }
            if self.min_aspect > 0.0 && self.max_aspect > 0.0 {
                if self.max_aspect < *w as f32 / *h as f32 {
                    *w = (*h as f32 * self.max_aspect + 0.5) as i32;
                } else if self.min_aspect < *h as f32 / *w as f32 {
                    *h = (*w as f32 * self.min_aspect + 0.5) as i32;
                }
            }
            if base_is_min {
                // increment calculation requires the base removed
                *w -= self.base_width;
                *h -= self.base_height;
            }
            if self.width_inc > 0 {
                *w -= *w % self.width_inc;
            }
            if self.height_inc > 0 {
                *h -= *h % self.height_inc;
            }
            *w = (*w + self.base_width).max(self.min_width);
            *h = (*h + self.base_height).max(self.min_height);
            if self.max_width > 0 {
                *w = (*w).min(self.max_width);
            }
            if self.max_height > 0 {
                *h = (*h).min(self.max_height);
            }
        }
        *x != self.x || *y != self.y || *w != self.w || *h != self.h
    }

    /// Commit a geometry to the client, applying the gap policy, and return
    /// the border width that belongs on the wire. Floating clients and
    /// floating layouts keep their geometry untouched; monocle and a lone
    /// tiled client swallow both gap and border; everything else is inset by
    /// the configured gap.
    pub fn commit_geometry(&mut self, x: i32, y: i32, w: i32, h: i32, ctx: &ResizeCtx) -> i32 {
        let (gap_offset, gap_incr, wire_bw) = if self.is_floating || ctx.floating_layout {
            (0, 0, self.bw)
        } else if ctx.monocle || ctx.ntiled == 1 {
            (0, -2 * config::BORDER_PX, 0)
        } else {
            (config::WINDOW_GAP, 2 * config::WINDOW_GAP, self.bw)
        };
        self.oldx = self.x;
        self.x = x + gap_offset;
        self.oldy = self.y;
        self.y = y + gap_offset;
        self.oldw = self.w;
        self.w = w - gap_incr;
        self.oldh = self.h;
        self.h = h - gap_incr;
        wire_bw
    }
}

/// The model half of a resize: size hints, then gap policy. Returns the wire
/// border width when the geometry actually changed; callers push the new
/// geometry to the server only in that case.
pub fn resize_geom(
    c: &mut Client,
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    interact: bool,
    ctx: &ResizeCtx,
) -> Option<i32> {
    let (mut x, mut y, mut w, mut h) = (x, y, w, h);
    if c.apply_size_hints(&mut x, &mut y, &mut w, &mut h, interact, ctx) {
        Some(c.commit_geometry(x, y, w, h, ctx))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ResizeCtx {
        ResizeCtx {
            sw: 1920,
            sh: 1098,
            bh: 18,
            wx: 0,
            wy: 18,
            ww: 1920,
            wh: 1080,
            floating_layout: false,
            monocle: false,
            ntiled: 2,
        }
    }

    fn client() -> Client {
        Client::new(Window(1), 0, 0, 100, 100, 0)
    }

    #[test]
    fn size_hints_are_idempotent() {
        let mut c = client();
        c.min_width = 120;
        c.min_height = 90;
        c.width_inc = 7;
        c.height_inc = 13;
        let ctx = ctx();

        let (mut x, mut y, mut w, mut h) = (10, 30, 400, 300);
        assert!(c.apply_size_hints(&mut x, &mut y, &mut w, &mut h, false, &ctx));
        c.x = x;
        c.y = y;
        c.w = w;
        c.h = h;

        let (mut x2, mut y2, mut w2, mut h2) = (x, y, w, h);
        assert!(!c.apply_size_hints(&mut x2, &mut y2, &mut w2, &mut h2, false, &ctx));
        assert_eq!((x2, y2, w2, h2), (x, y, w, h));
    }

    #[test]
    fn size_hints_respect_increments_and_base() {
        let mut c = client();
        c.base_width = 2;
        c.base_height = 4;
        c.width_inc = 10;
        c.height_inc = 10;
        let ctx = ctx();

        let (mut x, mut y, mut w, mut h) = (0, 18, 105, 105);
        c.apply_size_hints(&mut x, &mut y, &mut w, &mut h, false, &ctx);
        // width snaps to base + largest fitting multiple of the increment
        assert_eq!(w, 102);
        assert_eq!(h, 104);
    }

    #[test]
    fn size_hints_enforce_min_and_max() {
        let mut c = client();
        c.min_width = 200;
        c.min_height = 150;
        c.max_width = 640;
        c.max_height = 480;
        let ctx = ctx();

        let (mut x, mut y, mut w, mut h) = (0, 18, 50, 50);
        c.apply_size_hints(&mut x, &mut y, &mut w, &mut h, false, &ctx);
        assert_eq!((w, h), (200, 150));

        let (mut x2, mut y2, mut w2, mut h2) = (0, 18, 5000, 5000);
        c.apply_size_hints(&mut x2, &mut y2, &mut w2, &mut h2, false, &ctx);
        let _ = (x, y, x2, y2);
        assert_eq!((w2, h2), (640, 480));
    }

    #[test]
    fn size_hints_apply_aspect_limits() {
        let mut c = client();
        c.min_aspect = 1.0;
        c.max_aspect = 1.0;
        let ctx = ctx();

        let (mut x, mut y, mut w, mut h) = (0, 18, 400, 200);
        c.apply_size_hints(&mut x, &mut y, &mut w, &mut h, false, &ctx);
        assert_eq!(w, h);
    }

    #[test]
    fn offscreen_geometry_is_pulled_back_into_the_work_area() {
        let c = client();
        let ctx = ctx();

        let (mut x, mut y, mut w, mut h) = (5000, 18, 100, 100);
        c.apply_size_hints(&mut x, &mut y, &mut w, &mut h, false, &ctx);
        assert!(x < ctx.wx + ctx.ww);

        let (mut x, mut y2, mut w, mut h) = (-5000, 18, 100, 100);
        c.apply_size_hints(&mut x, &mut y2, &mut w, &mut h, false, &ctx);
        assert_eq!(x, ctx.wx);
        let _ = (y, y2, w, h);
    }

    #[test]
    fn gap_policy_insets_tiled_clients() {
        let mut c = client();
        c.bw = config::BORDER_PX;
        let ctx = ctx();
        let bw = c.commit_geometry(0, 18, 960, 1080, &ctx);
        assert_eq!(bw, c.bw);
        assert_eq!(c.x, config::WINDOW_GAP);
        assert_eq!(c.y, 18 + config::WINDOW_GAP);
        assert_eq!(c.w, 960 - 2 * config::WINDOW_GAP);
        assert_eq!(c.h, 1080 - 2 * config::WINDOW_GAP);
    }

    #[test]
    fn gap_policy_drops_border_for_a_lone_tiled_client() {
        let mut c = client();
        c.bw = config::BORDER_PX;
        let mut ctx = ctx();
        ctx.ntiled = 1;
        let bw = c.commit_geometry(0, 18, 1920 - 2 * c.bw, 1080 - 2 * c.bw, &ctx);
        assert_eq!(bw, 0);
        assert_eq!((c.x, c.y, c.w, c.h), (0, 18, 1920, 1080));
    }

    #[test]
    fn gap_policy_leaves_floating_clients_alone() {
        let mut c = client();
        c.is_floating = true;
        let ctx = ctx();
        let bw = c.commit_geometry(40, 60, 300, 200, &ctx);
        assert_eq!(bw, c.bw);
        assert_eq!((c.x, c.y, c.w, c.h), (40, 60, 300, 200));
    }

    #[test]
    fn commit_saves_previous_geometry() {
        let mut c = client();
        c.is_floating = true;
        let ctx = ctx();
        c.commit_geometry(40, 60, 300, 200, &ctx);
        assert_eq!((c.oldx, c.oldy, c.oldw, c.oldh), (0, 0, 100, 100));
    }
}
