use std::collections::HashMap;
use std::os::raw::{c_int, c_uint};

use x11::xlib;

use crate::client::{resize_geom, Client, ClientHandle, ResizeCtx};
use crate::colour::Colour;
use crate::config::{self, Click};
use crate::error::DwmError;
use crate::layouts::{self, Arrange};
use crate::monitor::Monitor;
use crate::utils;
use crate::xwrapper::{Atom, CursorId, KeySpecification, Net, Window, XWrapper, WM};

#[derive(PartialEq, Copy, Clone)]
pub enum CursorType {
    Normal,
    Resize,
    Move,
    Last,
}

/// Global window manager state. One of these exists per process; every event
/// handler and action mutates it.
pub struct Dwm {
    pub status_text: String,
    pub screen: c_int,
    pub screen_width: c_int,
    pub screen_height: c_int,
    pub bar_height: c_int,
    /// pixel width of the layout symbol on the bar, for click routing
    pub bar_lt_width: c_int,
    pub lr_padding: c_int,
    pub numlock_mask: c_uint,
    pub running: bool,
    pub cursor: [CursorId; CursorType::Last as usize],
    pub xwrapper: XWrapper,
    pub mons: Vec<Monitor>,
    pub selected_monitor: usize,
    /// monitor the pointer was last seen on, for root MotionNotify
    pub motion_mon: Option<usize>,
    pub root: Window,
    pub wm_check_window: Window,
    pub clients: HashMap<ClientHandle, Client>,
}

impl Dwm {
    pub fn new() -> Result<Dwm, DwmError> {
        let mut xwrapper = XWrapper::connect()?;
        if !xwrapper.support_locale() {
            eprintln!("warning: no locale support");
        }
        xwrapper.check_for_other_wm()?;
        utils::install_sigchld();

        let mut state = Dwm {
            status_text: String::new(),
            screen: 0,
            screen_width: 0,
            screen_height: 0,
            bar_height: 0,
            bar_lt_width: 0,
            lr_padding: 0,
            numlock_mask: 0,
            running: true,
            cursor: [CursorId(0); CursorType::Last as usize],
            xwrapper,
            mons: Vec::new(),
            selected_monitor: 0,
            motion_mon: None,
            root: Window(0),
            wm_check_window: Window(0),
            clients: HashMap::new(),
        };
        state.setup()?;
        Ok(state)
    }

    fn setup(&mut self) -> Result<(), DwmError> {
        self.screen = self.xwrapper.default_screen();
        self.screen_width = self.xwrapper.display_width(self.screen);
        self.screen_height = self.xwrapper.display_height(self.screen);
        self.root = self.xwrapper.root_window(self.screen);

        if !self.xwrapper.fontset_create(&config::FONTS) {
            return Err(DwmError::NoFonts);
        }
        let font_h = self.xwrapper.get_font_height() as i32;
        self.bar_height = font_h + 2;
        self.lr_padding = font_h;

        self.update_geometry();

        // XC_left_ptr, XC_sizing, XC_fleur
        self.cursor[CursorType::Normal as usize] = self.xwrapper.create_cursor(68);
        self.cursor[CursorType::Resize as usize] = self.xwrapper.create_cursor(120);
        self.cursor[CursorType::Move as usize] = self.xwrapper.create_cursor(52);

        self.update_bars();
        self.update_status();

        // advertise EWMH support
        self.wm_check_window = self.xwrapper.create_simple_window(self.root);
        let wmcheck = self.xwrapper.atoms.get(Atom::Net(Net::WMCheck));
        let wmname = self.xwrapper.atoms.get(Atom::Net(Net::WMName));
        self.xwrapper
            .replace_window_prop(self.wm_check_window, wmcheck, self.wm_check_window);
        self.xwrapper
            .replace_string_prop(self.wm_check_window, wmname, "dwm");
        self.xwrapper
            .replace_window_prop(self.root, wmcheck, self.wm_check_window);
        let supported = self.xwrapper.atoms.get(Atom::Net(Net::Supported));
        let net_atoms = self.xwrapper.atoms.net_atoms().to_vec();
        self.xwrapper
            .replace_atom_prop(self.root, supported, &net_atoms);
        self.xwrapper
            .delete_property(self.root, self.xwrapper.atoms.get(Atom::Net(Net::ClientList)));

        let event_mask = xlib::SubstructureRedirectMask
            | xlib::SubstructureNotifyMask
            | xlib::ButtonPressMask
            | xlib::PointerMotionMask
            | xlib::EnterWindowMask
            | xlib::LeaveWindowMask
            | xlib::StructureNotifyMask
            | xlib::PropertyChangeMask;
        self.xwrapper
            .set_root_attributes(self.cursor[CursorType::Normal as usize], event_mask);

        self.grab_keys();
        self.focus(None);
        log::info!(
            "managing screen {} ({}x{}) with {} monitor(s)",
            self.screen,
            self.screen_width,
            self.screen_height,
            self.mons.len()
        );
        Ok(())
    }

    pub fn grab_keys(&mut self) {
        self.numlock_mask = self.xwrapper.get_numlock_mask();
        let specs: Vec<KeySpecification> = config::keys()
            .iter()
            .map(|k| KeySpecification {
                mask: k.mask,
                keysym: k.keysym,
            })
            .collect();
        self.xwrapper.grab_keys(self.root, self.numlock_mask, &specs);
    }

    pub fn grab_buttons(&mut self, handle: ClientHandle, focused: bool) {
        let Some(win) = self.clients.get(&handle).map(|c| c.win) else {
            return;
        };
        self.numlock_mask = self.xwrapper.get_numlock_mask();
        let bindings: Vec<(u32, u32)> = config::buttons()
            .iter()
            .filter(|b| b.click == Click::ClientWin)
            .map(|b| (b.button, b.mask))
            .collect();
        self.xwrapper
            .grab_buttons(win, self.numlock_mask, focused, &bindings);
    }

    pub fn window_to_monitor(&self, w: xlib::Window) -> usize {
        if Window(w) == self.root {
            if let Some((x, y)) = self.xwrapper.query_pointer_position() {
                return self.rect_to_monitor(x, y, 1, 1);
            }
        }
        for (i, m) in self.mons.iter().enumerate() {
            if m.bar_window == Window(w) {
                return i;
            }
        }
        if let Some(handle) = self.window_to_client_handle(w) {
            if let Some(client) = self.clients.get(&handle) {
                return client.monitor_idx;
            }
        }
        self.selected_monitor
    }

    /// The monitor a rectangle overlaps the most.
    pub fn rect_to_monitor(&self, x: i32, y: i32, w: i32, h: i32) -> usize {
        let mut r = self.selected_monitor;
        let mut area = 0;
        for (i, m) in self.mons.iter().enumerate() {
            let a = m.intersect_area(x, y, w, h);
            if a > area {
                area = a;
                r = i;
            }
        }
        r
    }

    pub(crate) fn resize_ctx(&self, mon_idx: usize) -> ResizeCtx {
        let mon = &self.mons[mon_idx];
        let layout = mon.layout();
        ResizeCtx {
            sw: self.screen_width,
            sh: self.screen_height,
            bh: self.bar_height,
            wx: mon.wx,
            wy: mon.wy,
            ww: mon.ww,
            wh: mon.wh,
            floating_layout: layout.arrange.is_none(),
            monocle: layout.arrange == Some(Arrange::Monocle),
            ntiled: layouts::tiled_clients(&self.clients, mon).len(),
        }
    }

    /// Resize honoring size hints; no-op if the hinted geometry matches the
    /// current one.
    pub fn resize(&mut self, handle: ClientHandle, x: i32, y: i32, w: i32, h: i32, interact: bool) {
        let Some(mon_idx) = self.clients.get(&handle).map(|c| c.monitor_idx) else {
            return;
        };
        let ctx = self.resize_ctx(mon_idx);
        let Some(c) = self.clients.get_mut(&handle) else {
            return;
        };
        if let Some(wire_bw) = resize_geom(c, x, y, w, h, interact, &ctx) {
            self.publish_geometry(handle, wire_bw);
        }
    }

    /// Resize bypassing size hints (fullscreen, configure requests).
    pub fn resize_client(&mut self, handle: ClientHandle, x: i32, y: i32, w: i32, h: i32) {
        let Some(mon_idx) = self.clients.get(&handle).map(|c| c.monitor_idx) else {
            return;
        };
        let ctx = self.resize_ctx(mon_idx);
        let Some(c) = self.clients.get_mut(&handle) else {
            return;
        };
        let wire_bw = c.commit_geometry(x, y, w, h, &ctx);
        self.publish_geometry(handle, wire_bw);
    }

    fn publish_geometry(&mut self, handle: ClientHandle, wire_bw: i32) {
        let Some(c) = self.clients.get(&handle) else {
            return;
        };
        self.xwrapper
            .configure_window(c.win, c.x, c.y, c.w, c.h, wire_bw);
        self.send_configure(handle);
        self.xwrapper.sync(false);
    }

    pub fn send_configure(&self, handle: ClientHandle) {
        if let Some(c) = self.clients.get(&handle) {
            self.xwrapper
                .send_configure_event(c.win, c.x, c.y, c.w, c.h, c.bw);
        }
    }

    pub fn arrange(&mut self, mon_idx: Option<usize>) {
        match mon_idx {
            Some(idx) => {
                self.show_hide(idx);
                self.arrange_monitor(idx);
                self.restack(idx);
            }
            None => {
                for i in 0..self.mons.len() {
                    self.show_hide(i);
                }
                for i in 0..self.mons.len() {
                    self.arrange_monitor(i);
                }
            }
        }
    }

    pub fn arrange_monitor(&mut self, mon_idx: usize) {
        self.mons[mon_idx].lt_symbol = self.mons[mon_idx].layout().symbol.to_string();
        let Some(kind) = self.mons[mon_idx].layout().arrange else {
            return;
        };
        let ctx = self.resize_ctx(mon_idx);
        let changed = layouts::arrange(kind, &mut self.clients, &mut self.mons[mon_idx], &ctx);
        for (handle, wire_bw) in changed {
            self.publish_geometry(handle, wire_bw);
        }
    }

    /// Move visible clients into place and park hidden ones off-screen.
    fn show_hide(&mut self, mon_idx: usize) {
        let stack = self.mons[mon_idx].stack.clone();
        // visible clients top down
        for &handle in &stack {
            let Some(c) = self.clients.get(&handle) else {
                continue;
            };
            if !c.is_visible_on(&self.mons[mon_idx]) {
                continue;
            }
            self.xwrapper.move_window(c.win, c.x, c.y);
            let mon = &self.mons[c.monitor_idx];
            if (mon.layout().arrange.is_none() || c.is_floating) && !c.is_fullscreen {
                let (x, y, w, h) = (c.x, c.y, c.w, c.h);
                self.resize(handle, x, y, w, h, false);
            }
        }
        // hidden clients bottom up
        for &handle in stack.iter().rev() {
            if let Some(c) = self.clients.get(&handle) {
                if !c.is_visible_on(&self.mons[mon_idx]) {
                    self.xwrapper.move_window(c.win, -2 * c.total_w(), c.y);
                }
            }
        }
    }

    /// Raise the selected client if it floats, then pin every visible tiled
    /// client below the bar in stack order. EnterNotify events produced by
    /// the shuffle are dropped so focus doesn't jump.
    pub fn restack(&mut self, mon_idx: usize) {
        self.draw_bar(mon_idx);
        let Some(sel) = self.mons[mon_idx].sel else {
            return;
        };
        if let Some(c) = self.clients.get(&sel) {
            if c.is_floating || self.mons[mon_idx].layout().arrange.is_none() {
                self.xwrapper.raise_window(c.win);
            }
        }
        if self.mons[mon_idx].layout().arrange.is_some() {
            let mon = &self.mons[mon_idx];
            let mut order = vec![mon.bar_window];
            for h in &mon.stack {
                if let Some(c) = self.clients.get(h) {
                    if !c.is_floating && c.is_visible_on(mon) {
                        order.push(c.win);
                    }
                }
            }
            self.xwrapper.stack_below(&order);
        }
        self.xwrapper.sync(false);
        self.xwrapper.drain_events(xlib::EnterWindowMask);

        if mon_idx == self.selected_monitor
            && self
                .clients
                .get(&sel)
                .is_some_and(|c| c.is_visible_on(&self.mons[mon_idx]))
        {
            self.warp(Some(sel));
        }
    }

    /// Focus a client, or the first visible one on the focus stack when
    /// given none. Promotes the target to the head of the stack.
    pub fn focus(&mut self, handle: Option<ClientHandle>) {
        let mut handle = handle;
        let visible = handle
            .and_then(|h| self.clients.get(&h))
            .is_some_and(|c| c.is_visible_on(&self.mons[c.monitor_idx]));
        if !visible {
            let mon = &self.mons[self.selected_monitor];
            handle = mon
                .stack
                .iter()
                .find(|h| self.clients.get(h).is_some_and(|c| c.is_visible_on(mon)))
                .copied();
        }
        let prev = self.mons[self.selected_monitor].sel;
        if let Some(p) = prev {
            if handle != Some(p) {
                self.unfocus(p, false);
            }
        }
        if let Some(h) = handle {
            let Some((mon_idx, win, urgent)) = self
                .clients
                .get(&h)
                .map(|c| (c.monitor_idx, c.win, c.is_urgent))
            else {
                return;
            };
            if mon_idx != self.selected_monitor {
                self.selected_monitor = mon_idx;
            }
            if urgent {
                self.clear_urgent(h);
            }
            self.mons[mon_idx].detach_stack(h, &self.clients);
            self.mons[mon_idx].attach_stack(h);
            self.grab_buttons(h, true);
            self.xwrapper.set_window_border_color(win, Colour::SelBorder);
            self.set_focus(h);
        } else {
            self.xwrapper.set_input_focus(self.root);
            self.xwrapper.delete_property(
                self.root,
                self.xwrapper.atoms.get(Atom::Net(Net::ActiveWindow)),
            );
        }
        self.mons[self.selected_monitor].sel = handle;
        self.draw_bars();
    }

    pub fn unfocus(&mut self, handle: ClientHandle, setfocus: bool) {
        let Some(win) = self.clients.get(&handle).map(|c| c.win) else {
            return;
        };
        self.grab_buttons(handle, false);
        self.xwrapper.set_window_border_color(win, Colour::NormBorder);
        if setfocus {
            self.xwrapper.set_input_focus(self.root);
            self.xwrapper.delete_property(
                self.root,
                self.xwrapper.atoms.get(Atom::Net(Net::ActiveWindow)),
            );
        }
    }

    /// Hand the X input focus to a client, respecting the ICCCM input model.
    pub fn set_focus(&mut self, handle: ClientHandle) {
        let Some(c) = self.clients.get(&handle) else {
            return;
        };
        if !c.never_focus {
            self.xwrapper.set_input_focus(c.win);
            self.xwrapper.replace_window_prop(
                self.root,
                self.xwrapper.atoms.get(Atom::Net(Net::ActiveWindow)),
                c.win,
            );
        }
        self.xwrapper
            .send_event(c.win, self.xwrapper.atoms.get(Atom::Wm(WM::TakeFocus)));
    }

    pub fn clear_urgent(&mut self, handle: ClientHandle) {
        if let Some(c) = self.clients.get_mut(&handle) {
            c.is_urgent = false;
            self.xwrapper.clear_urgency(c.win);
        }
    }

    /// Detach a client and reattach it at the head of the client list, then
    /// focus and rearrange.
    pub fn pop(&mut self, handle: ClientHandle) {
        let Some(mon_idx) = self.clients.get(&handle).map(|c| c.monitor_idx) else {
            return;
        };
        self.mons[mon_idx].detach(handle);
        self.mons[mon_idx].attach(handle);
        self.focus(Some(handle));
        self.arrange(Some(mon_idx));
    }

    pub fn sendmon(&mut self, handle: ClientHandle, target: usize) {
        let Some(src) = self.clients.get(&handle).map(|c| c.monitor_idx) else {
            return;
        };
        if src == target {
            return;
        }
        self.unfocus(handle, true);
        self.mons[src].detach(handle);
        self.mons[src].detach_stack(handle, &self.clients);
        let tags = self.mons[target].tagset[self.mons[target].seltags as usize];
        if let Some(c) = self.clients.get_mut(&handle) {
            c.monitor_idx = target;
            c.tags = tags;
        }
        self.mons[target].attach(handle);
        self.mons[target].attach_stack(handle);
        self.focus(None);
        self.arrange(None);
    }

    /// Monitor by number, falling back to the last one.
    pub fn dirtomon(&self, num: i32) -> usize {
        self.mons
            .iter()
            .position(|m| m.num == num)
            .unwrap_or(self.mons.len() - 1)
    }

    pub fn set_fullscreen(&mut self, handle: ClientHandle, fullscreen: bool) {
        let Some((win, mon_idx, is_fullscreen)) = self
            .clients
            .get(&handle)
            .map(|c| (c.win, c.monitor_idx, c.is_fullscreen))
        else {
            return;
        };
        let net_state = self.xwrapper.atoms.get(Atom::Net(Net::WMState));
        let net_fs = self.xwrapper.atoms.get(Atom::Net(Net::WMFullscreen));

        if fullscreen && !is_fullscreen {
            self.xwrapper.replace_atom_prop(win, net_state, &[net_fs]);
            if let Some(c) = self.clients.get_mut(&handle) {
                c.is_fullscreen = true;
                c.old_state = c.is_floating;
                c.old_bw = c.bw;
                c.bw = 0;
                c.is_floating = true;
            }
            let (mx, my, mw, mh) = {
                let m = &self.mons[mon_idx];
                (m.mx, m.my, m.mw, m.mh)
            };
            self.resize_client(handle, mx, my, mw, mh);
            self.xwrapper.raise_window(win);
        } else if !fullscreen && is_fullscreen {
            self.xwrapper.replace_atom_prop(win, net_state, &[]);
            let mut geom = None;
            if let Some(c) = self.clients.get_mut(&handle) {
                c.is_fullscreen = false;
                c.is_floating = c.old_state;
                c.bw = c.old_bw;
                c.x = c.oldx;
                c.y = c.oldy;
                c.w = c.oldw;
                c.h = c.oldh;
                geom = Some((c.x, c.y, c.w, c.h));
            }
            if let Some((x, y, w, h)) = geom {
                self.resize_client(handle, x, y, w, h);
            }
            self.arrange(Some(mon_idx));
        }
    }

    /// Bring the pointer to the client (or the work-area center) unless it's
    /// already inside it or parked on the bar.
    pub fn warp(&self, handle: Option<ClientHandle>) {
        let Some(h) = handle else {
            let mon = &self.mons[self.selected_monitor];
            self.xwrapper
                .warp_pointer(self.root, mon.wx + mon.ww / 2, mon.wy + mon.wh / 2);
            return;
        };
        let Some(c) = self.clients.get(&h) else {
            return;
        };
        if config::WARP_IGNORE_HINTED {
            let wtype = self
                .xwrapper
                .get_atom_prop(c.win, self.xwrapper.atoms.get(Atom::Net(Net::WMWindowType)));
            let dialog = self
                .xwrapper
                .atoms
                .get(Atom::Net(Net::WMWindowTypeDialog));
            let notification = self
                .xwrapper
                .atoms
                .get(Atom::Net(Net::WMWindowTypeNotification));
            if wtype == Some(dialog) || wtype == Some(notification) {
                return;
            }
        }
        let Some((x, y)) = self.xwrapper.query_pointer_position() else {
            return;
        };
        let mon = &self.mons[c.monitor_idx];
        if (x > c.x - c.bw
            && y > c.y - c.bw
            && x < c.x + c.w + c.bw * 2
            && y < c.y + c.h + c.bw * 2)
            || (y > mon.by && y < mon.by + self.bar_height)
            || (mon.top_bar && y == 0)
        {
            return;
        }
        self.xwrapper.warp_pointer(c.win, c.w / 2, c.h / 2);
    }

    /// Rebuild the monitor list from the physical screens. Returns whether
    /// anything moved.
    pub fn update_geometry(&mut self) -> bool {
        let mut dirty = false;
        let bh = self.bar_height;
        match self.xwrapper.xinerama_screens() {
            Some(screens) => {
                let mut unique: Vec<(i32, i32, i32, i32)> = Vec::new();
                for s in screens {
                    if !unique.contains(&s) {
                        unique.push(s);
                    }
                }
                let nmons = self.mons.len();
                if unique.len() >= nmons {
                    for _ in nmons..unique.len() {
                        self.mons.push(Monitor::default());
                    }
                    for (i, &(x, y, w, h)) in unique.iter().enumerate() {
                        let m = &mut self.mons[i];
                        if i >= nmons || x != m.mx || y != m.my || w != m.mw || h != m.mh {
                            dirty = true;
                            m.num = i as i32;
                            m.mx = x;
                            m.wx = x;
                            m.my = y;
                            m.wy = y;
                            m.mw = w;
                            m.ww = w;
                            m.mh = h;
                            m.wh = h;
                            m.update_bar_pos(bh);
                        }
                    }
                } else {
                    // fewer screens than monitors: orphans move to the first
                    for i in unique.len()..nmons {
                        dirty = true;
                        let orphans = self.mons[i].clients.clone();
                        for handle in orphans {
                            self.mons[i].detach(handle);
                            self.mons[i].detach_stack(handle, &self.clients);
                            if let Some(c) = self.clients.get_mut(&handle) {
                                c.monitor_idx = 0;
                            }
                            self.mons[0].attach(handle);
                            self.mons[0].attach_stack(handle);
                        }
                    }
                    if self.selected_monitor >= unique.len() {
                        self.selected_monitor = 0;
                    }
                    for m in self.mons.split_off(unique.len()) {
                        log::info!("monitor {} disappeared", m.num);
                        self.xwrapper.unmap_window(m.bar_window);
                        self.xwrapper.destroy_window(m.bar_window);
                    }
                }
            }
            None => {
                if self.mons.is_empty() {
                    self.mons.push(Monitor::default());
                }
                let (sw, sh) = (self.screen_width, self.screen_height);
                let m = &mut self.mons[0];
                if m.mw != sw || m.mh != sh {
                    dirty = true;
                    m.mw = sw;
                    m.ww = sw;
                    m.mh = sh;
                    m.wh = sh;
                    m.update_bar_pos(bh);
                }
            }
        }
        if dirty {
            self.selected_monitor = 0;
            self.selected_monitor = self.window_to_monitor(self.root.0);
        }
        dirty
    }

    /// Create bar windows for monitors that don't have one yet.
    pub fn update_bars(&mut self) {
        let bh = self.bar_height;
        let cursor = self.cursor[CursorType::Normal as usize];
        for i in 0..self.mons.len() {
            if self.mons[i].bar_window != Window(0) {
                continue;
            }
            let (wx, by, ww) = {
                let m = &self.mons[i];
                (m.wx, m.by, m.ww)
            };
            let barwin = self
                .xwrapper
                .create_bar_window(wx, by, ww as u32, bh as u32, cursor);
            self.mons[i].bar_window = barwin;
            self.xwrapper.map_raised(barwin);
        }
    }

    /// Status text comes from WM_NAME on the root window.
    pub fn update_status(&mut self) {
        self.status_text = self
            .xwrapper
            .get_text_prop(self.root, xlib::XA_WM_NAME)
            .unwrap_or_else(|| concat!("dwm-", env!("CARGO_PKG_VERSION")).to_string());
        self.draw_bar(self.selected_monitor);
    }

    pub fn update_title(&mut self, handle: ClientHandle) {
        let Some(win) = self.clients.get(&handle).map(|c| c.win) else {
            return;
        };
        let mut name = self.xwrapper.get_window_title(win).unwrap_or_default();
        if name.chars().count() > 255 {
            name = name.chars().take(255).collect();
        }
        if name.is_empty() {
            // hack to mark broken clients
            name = "broken".to_string();
        }
        if let Some(c) = self.clients.get_mut(&handle) {
            c.name = name;
        }
    }

    pub fn update_window_type(&mut self, handle: ClientHandle) {
        let Some(win) = self.clients.get(&handle).map(|c| c.win) else {
            return;
        };
        let net_state = self.xwrapper.atoms.get(Atom::Net(Net::WMState));
        let net_fs = self.xwrapper.atoms.get(Atom::Net(Net::WMFullscreen));
        let wtype_atom = self.xwrapper.atoms.get(Atom::Net(Net::WMWindowType));
        let dialog = self.xwrapper.atoms.get(Atom::Net(Net::WMWindowTypeDialog));

        if self.xwrapper.get_atom_props(win, net_state).contains(&net_fs) {
            self.set_fullscreen(handle, true);
        }
        if self.xwrapper.get_atom_prop(win, wtype_atom) == Some(dialog) {
            if let Some(c) = self.clients.get_mut(&handle) {
                c.is_floating = true;
            }
        }
    }

    pub fn update_wm_hints(&mut self, handle: ClientHandle) {
        let Some(win) = self.clients.get(&handle).map(|c| c.win) else {
            return;
        };
        let Some(hints) = self.xwrapper.wm_hints(win) else {
            return;
        };
        if self.mons[self.selected_monitor].sel == Some(handle) && hints.urgent {
            // the focused client has no business being urgent
            self.xwrapper.clear_urgency(win);
        } else if let Some(c) = self.clients.get_mut(&handle) {
            c.is_urgent = hints.urgent;
        }
        if let Some(c) = self.clients.get_mut(&handle) {
            c.never_focus = hints.input.is_some_and(|input| !input);
        }
    }

    pub fn update_size_hints(&mut self, handle: ClientHandle) {
        let Some(win) = self.clients.get(&handle).map(|c| c.win) else {
            return;
        };
        let size = self.xwrapper.get_wm_normal_hints(win);
        let Some(c) = self.clients.get_mut(&handle) else {
            return;
        };
        let Some(size) = size else {
            c.base_width = 0;
            c.base_height = 0;
            c.width_inc = 0;
            c.height_inc = 0;
            c.max_width = 0;
            c.max_height = 0;
            c.min_width = 0;
            c.min_height = 0;
            c.min_aspect = 0.0;
            c.max_aspect = 0.0;
            c.is_fixed = false;
            return;
        };
        if size.flags & xlib::PBaseSize != 0 {
            c.base_width = size.base_width;
            c.base_height = size.base_height;
        } else if size.flags & xlib::PMinSize != 0 {
            c.base_width = size.min_width;
            c.base_height = size.min_height;
        } else {
            c.base_width = 0;
            c.base_height = 0;
        }
        if size.flags & xlib::PResizeInc != 0 {
            c.width_inc = size.width_inc;
            c.height_inc = size.height_inc;
        } else {
            c.width_inc = 0;
            c.height_inc = 0;
        }
        if size.flags & xlib::PMaxSize != 0 {
            c.max_width = size.max_width;
            c.max_height = size.max_height;
        } else {
            c.max_width = 0;
            c.max_height = 0;
        }
        if size.flags & xlib::PMinSize != 0 {
            c.min_width = size.min_width;
            c.min_height = size.min_height;
        } else if size.flags & xlib::PBaseSize != 0 {
            c.min_width = size.base_width;
            c.min_height = size.base_height;
        } else {
            c.min_width = 0;
            c.min_height = 0;
        }
        if size.flags & xlib::PAspect != 0 {
            c.min_aspect = size.min_aspect.y as f32 / size.min_aspect.x as f32;
            c.max_aspect = size.max_aspect.x as f32 / size.max_aspect.y as f32;
        } else {
            c.min_aspect = 0.0;
            c.max_aspect = 0.0;
        }
        c.is_fixed = c.max_width > 0
            && c.min_width > 0
            && c.max_height > 0
            && c.min_height > 0
            && c.max_width == c.min_width
            && c.max_height == c.min_height;
    }

    /// Rewrite _NET_CLIENT_LIST from scratch.
    pub fn update_client_list(&self) {
        let prop = self.xwrapper.atoms.get(Atom::Net(Net::ClientList));
        self.xwrapper.delete_property(self.root, prop);
        for m in &self.mons {
            for h in &m.clients {
                if let Some(c) = self.clients.get(h) {
                    self.xwrapper.append_window_prop(self.root, prop, c.win);
                }
            }
        }
    }
}

impl Drop for Dwm {
    fn drop(&mut self) {
        for i in 0..self.mons.len() {
            while let Some(&handle) = self.mons[i].stack.first() {
                self.unmanage(handle, false);
            }
        }
        self.xwrapper.ungrab_keys(self.root);
        for m in &self.mons {
            self.xwrapper.unmap_window(m.bar_window);
            self.xwrapper.destroy_window(m.bar_window);
        }
        self.xwrapper.destroy_window(self.wm_check_window);
        for cur in self.cursor {
            self.xwrapper.free_cursor(cur);
        }
        self.xwrapper.restore_input_focus();
        self.xwrapper.delete_property(
            self.root,
            self.xwrapper.atoms.get(Atom::Net(Net::ActiveWindow)),
        );
        self.xwrapper.sync(false);
    }
}
