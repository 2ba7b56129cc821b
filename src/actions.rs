use x11::xlib;

use crate::client::ClientHandle;
use crate::command::Command;
use crate::config::{SNAP, TAG_MASK};
use crate::events;
use crate::layouts::{self, Layout};
use crate::state::{CursorType, Dwm};
use crate::utils;
use crate::xwrapper::{Atom, Event, MOUSE_MASK, WM};

/// Everything a key or button can be bound to.
#[derive(Debug, Clone)]
pub enum Action {
    Spawn(Command),
    ToggleBar,
    FocusStack(i32),
    SetMFact(f32),
    Zoom,
    View(u32),
    ToggleView(u32),
    Tag(u32),
    ToggleTag(u32),
    SetLayout(Option<&'static Layout>),
    ToggleFloating,
    FocusMon(i32),
    TagMon(i32),
    KillClient,
    MoveMouse,
    ResizeMouse,
    Quit,
}

/// arg < 1.0 adjusts mfact relative, >= 1.0 sets it absolute (minus one);
/// out-of-range results are rejected rather than clamped.
pub(crate) fn adjusted_mfact(current: f32, arg: f32) -> Option<f32> {
    let f = if arg < 1.0 { arg + current } else { arg - 1.0 };
    if !(0.1..=0.9).contains(&f) {
        return None;
    }
    Some(f)
}

impl Action {
    pub fn execute(&self, state: &mut Dwm) {
        match self {
            Action::Spawn(cmd) => {
                let num = state.mons[state.selected_monitor].num;
                utils::spawn(&cmd.argv(num), Some(state.xwrapper.connection_number()));
            }
            Action::ToggleBar => {
                let mon_idx = state.selected_monitor;
                let bh = state.bar_height;
                let mon = &mut state.mons[mon_idx];
                mon.show_bar = !mon.show_bar;
                mon.update_bar_pos(bh);
                state.xwrapper.move_resize_window(
                    mon.bar_window,
                    mon.wx,
                    mon.by,
                    mon.ww as u32,
                    bh as u32,
                );
                state.arrange(Some(mon_idx));
            }
            Action::FocusStack(i) => {
                let mon_idx = state.selected_monitor;
                let Some(sel) = state.mons[mon_idx].sel else {
                    return;
                };
                let mon = &state.mons[mon_idx];
                let visible: Vec<ClientHandle> = mon
                    .clients
                    .iter()
                    .filter(|h| {
                        state
                            .clients
                            .get(h)
                            .is_some_and(|c| c.is_visible_on(mon))
                    })
                    .copied()
                    .collect();
                if visible.is_empty() {
                    return;
                }
                let target = match visible.iter().position(|&h| h == sel) {
                    Some(pos) if *i > 0 => visible[(pos + 1) % visible.len()],
                    Some(pos) => visible[(pos + visible.len() - 1) % visible.len()],
                    None => visible[0],
                };
                state.focus(Some(target));
                state.restack(state.selected_monitor);
            }
            Action::SetMFact(arg) => {
                let mon_idx = state.selected_monitor;
                if state.mons[mon_idx].layout().arrange.is_none() {
                    return;
                }
                if let Some(f) = adjusted_mfact(state.mons[mon_idx].mfact, *arg) {
                    state.mons[mon_idx].mfact = f;
                    state.arrange(Some(mon_idx));
                }
            }
            Action::Zoom => {
                let mon_idx = state.selected_monitor;
                let mon = &state.mons[mon_idx];
                if mon.layout().arrange.is_none() {
                    return;
                }
                let Some(sel) = mon.sel else {
                    return;
                };
                if state.clients.get(&sel).is_none_or(|c| c.is_floating) {
                    return;
                }
                let tiled = layouts::tiled_clients(&state.clients, mon);
                let mut target = sel;
                if tiled.first() == Some(&sel) {
                    // the master zooms the next tiled client instead
                    match tiled.get(1) {
                        Some(&next) => target = next,
                        None => return,
                    }
                }
                state.pop(target);
            }
            Action::View(mask) => {
                let mon_idx = state.selected_monitor;
                if state.mons[mon_idx].view(*mask) {
                    state.focus(None);
                    state.arrange(Some(mon_idx));
                }
            }
            Action::ToggleView(mask) => {
                let mon_idx = state.selected_monitor;
                if state.mons[mon_idx].toggle_view(*mask) {
                    state.focus(None);
                    state.arrange(Some(mon_idx));
                }
            }
            Action::Tag(mask) => {
                let mon_idx = state.selected_monitor;
                let Some(sel) = state.mons[mon_idx].sel else {
                    return;
                };
                if mask & TAG_MASK == 0 {
                    return;
                }
                if let Some(c) = state.clients.get_mut(&sel) {
                    c.tags = mask & TAG_MASK;
                }
                state.focus(None);
                state.arrange(Some(mon_idx));
            }
            Action::ToggleTag(mask) => {
                let mon_idx = state.selected_monitor;
                let Some(sel) = state.mons[mon_idx].sel else {
                    return;
                };
                let Some(c) = state.clients.get_mut(&sel) else {
                    return;
                };
                let newtags = c.tags ^ (mask & TAG_MASK);
                if newtags != 0 {
                    c.tags = newtags;
                    state.focus(None);
                    state.arrange(Some(mon_idx));
                }
            }
            Action::SetLayout(layout) => {
                let mon_idx = state.selected_monitor;
                let current = state.mons[mon_idx].layout();
                let switch = match layout {
                    None => true,
                    Some(l) => !std::ptr::eq(*l, current),
                };
                if switch {
                    state.mons[mon_idx].sellt ^= 1;
                }
                if let Some(l) = layout {
                    let sellt = state.mons[mon_idx].sellt as usize;
                    state.mons[mon_idx].lt[sellt] = l;
                }
                let mon = &mut state.mons[mon_idx];
                mon.lt_symbol = mon.layout().symbol.to_string();
                if mon.sel.is_some() {
                    state.arrange(Some(mon_idx));
                } else {
                    state.draw_bar(mon_idx);
                }
            }
            Action::ToggleFloating => {
                let mon_idx = state.selected_monitor;
                let Some(sel) = state.mons[mon_idx].sel else {
                    return;
                };
                let Some(c) = state.clients.get_mut(&sel) else {
                    return;
                };
                if c.is_fullscreen {
                    return;
                }
                c.is_floating = !c.is_floating || c.is_fixed;
                if c.is_floating {
                    let (x, y, w, h) = (c.x, c.y, c.w, c.h);
                    state.resize(sel, x, y, w, h, false);
                }
                state.arrange(Some(mon_idx));
            }
            Action::FocusMon(i) => {
                if state.mons.len() <= 1 {
                    return;
                }
                let target = state.dirtomon(*i);
                if target == state.selected_monitor {
                    return;
                }
                if let Some(sel) = state.mons[state.selected_monitor].sel {
                    state.unfocus(sel, false);
                }
                state.selected_monitor = target;
                state.focus(None);
                let sel = state.mons[target].sel;
                state.warp(sel);
            }
            Action::TagMon(i) => {
                if state.mons.len() <= 1 {
                    return;
                }
                let mon_idx = state.selected_monitor;
                if let Some(sel) = state.mons[mon_idx].sel {
                    let target = state.dirtomon(*i);
                    state.sendmon(sel, target);
                }
            }
            Action::KillClient => {
                let mon_idx = state.selected_monitor;
                let Some(sel) = state.mons[mon_idx].sel else {
                    return;
                };
                let Some(win) = state.clients.get(&sel).map(|c| c.win) else {
                    return;
                };
                let delete = state.xwrapper.atoms.get(Atom::Wm(WM::Delete));
                if !state.xwrapper.send_event(win, delete) {
                    state.xwrapper.grab_server();
                    state.xwrapper.set_ignore_error_handler();
                    state.xwrapper.set_close_down_mode(xlib::DestroyAll);
                    state.xwrapper.kill_client(win);
                    state.xwrapper.sync(false);
                    state.xwrapper.set_default_error_handler();
                    state.xwrapper.ungrab_server();
                }
            }
            Action::MoveMouse => state.move_mouse(),
            Action::ResizeMouse => state.resize_mouse(),
            Action::Quit => {
                state.running = false;
            }
        }
    }
}

impl Dwm {
    /// Drag the selected client with the pointer, snapping to the work-area
    /// edges. A tiled client that is dragged beyond the snap distance pops
    /// out into floating mode.
    pub fn move_mouse(&mut self) {
        let mon_idx = self.selected_monitor;
        let Some(handle) = self.mons[mon_idx].sel else {
            return;
        };
        let Some(c) = self.clients.get(&handle) else {
            return;
        };
        if c.is_fullscreen {
            return;
        }
        let (ocx, ocy) = (c.x, c.y);
        self.restack(mon_idx);
        if !self
            .xwrapper
            .grab_pointer(self.cursor[CursorType::Move as usize])
        {
            return;
        }
        let Some((px, py)) = self.xwrapper.query_pointer_position() else {
            self.xwrapper.ungrab_pointer();
            return;
        };

        let mut last_time: xlib::Time = 0;
        loop {
            let xev = self
                .xwrapper
                .mask_event(MOUSE_MASK | xlib::ExposureMask | xlib::SubstructureRedirectMask);
            match Event::decode(xev) {
                Some(Event::ConfigureRequest(e)) => events::configure_request(self, &e),
                Some(Event::Expose(e)) => events::expose(self, &e),
                Some(Event::MapRequest(e)) => events::map_request(self, &e),
                Some(Event::MotionNotify(e)) => {
                    if e.time.wrapping_sub(last_time) <= 1000 / 60 {
                        continue;
                    }
                    last_time = e.time;

                    let Some(c) = self.clients.get(&handle) else {
                        break;
                    };
                    let (tw, th, cx, cy, floating) =
                        (c.total_w(), c.total_h(), c.x, c.y, c.is_floating);
                    let mut nx = ocx + (e.x - px);
                    let mut ny = ocy + (e.y - py);
                    let mon = &self.mons[self.selected_monitor];
                    let arranged = mon.layout().arrange.is_some();
                    if nx >= mon.wx
                        && nx <= mon.wx + mon.ww
                        && ny >= mon.wy
                        && ny <= mon.wy + mon.wh
                    {
                        if (mon.wx - nx).abs() < SNAP {
                            nx = mon.wx;
                        } else if ((mon.wx + mon.ww) - (nx + tw)).abs() < SNAP {
                            nx = mon.wx + mon.ww - tw;
                        }
                        if (mon.wy - ny).abs() < SNAP {
                            ny = mon.wy;
                        } else if ((mon.wy + mon.wh) - (ny + th)).abs() < SNAP {
                            ny = mon.wy + mon.wh - th;
                        }
                        if !floating
                            && arranged
                            && ((nx - cx).abs() > SNAP || (ny - cy).abs() > SNAP)
                        {
                            Action::ToggleFloating.execute(self);
                        }
                    }
                    let floating_now = self
                        .clients
                        .get(&handle)
                        .is_some_and(|c| c.is_floating);
                    let (w, h) = match self.clients.get(&handle) {
                        Some(c) => (c.w, c.h),
                        None => break,
                    };
                    if self.mons[self.selected_monitor].layout().arrange.is_none()
                        || floating_now
                    {
                        self.resize(handle, nx, ny, w, h, true);
                    }
                }
                Some(Event::ButtonRelease(_)) => break,
                _ => {}
            }
        }
        self.xwrapper.ungrab_pointer();

        if let Some(c) = self.clients.get(&handle) {
            let target = self.rect_to_monitor(c.x, c.y, c.w, c.h);
            if target != self.selected_monitor {
                self.sendmon(handle, target);
                self.selected_monitor = target;
                self.focus(None);
            }
        }
    }

    /// Resize the selected client by dragging its bottom-right corner.
    pub fn resize_mouse(&mut self) {
        let mon_idx = self.selected_monitor;
        let Some(handle) = self.mons[mon_idx].sel else {
            return;
        };
        let Some(c) = self.clients.get(&handle) else {
            return;
        };
        if c.is_fullscreen {
            return;
        }
        let (ocx, ocy) = (c.x, c.y);
        self.restack(mon_idx);
        if !self
            .xwrapper
            .grab_pointer(self.cursor[CursorType::Resize as usize])
        {
            return;
        }
        let (win, w, h, bw) = {
            let c = &self.clients[&handle];
            (c.win, c.w, c.h, c.bw)
        };
        self.xwrapper.warp_pointer(win, w + bw - 1, h + bw - 1);

        let mut last_time: xlib::Time = 0;
        loop {
            let xev = self
                .xwrapper
                .mask_event(MOUSE_MASK | xlib::ExposureMask | xlib::SubstructureRedirectMask);
            match Event::decode(xev) {
                Some(Event::ConfigureRequest(e)) => events::configure_request(self, &e),
                Some(Event::Expose(e)) => events::expose(self, &e),
                Some(Event::MapRequest(e)) => events::map_request(self, &e),
                Some(Event::MotionNotify(e)) => {
                    if e.time.wrapping_sub(last_time) <= 1000 / 60 {
                        continue;
                    }
                    last_time = e.time;

                    let Some(c) = self.clients.get(&handle) else {
                        break;
                    };
                    let nw = (e.x - ocx - 2 * c.bw + 1).max(1);
                    let nh = (e.y - ocy - 2 * c.bw + 1).max(1);
                    let (cw, ch, cx, cy, floating) = (c.w, c.h, c.x, c.y, c.is_floating);
                    let cmon = c.monitor_idx;
                    let mon = &self.mons[self.selected_monitor];
                    let arranged = mon.layout().arrange.is_some();
                    if self.mons[cmon].wx + nw >= mon.wx
                        && self.mons[cmon].wx + nw <= mon.wx + mon.ww
                        && self.mons[cmon].wy + nh >= mon.wy
                        && self.mons[cmon].wy + nh <= mon.wy + mon.wh
                        && !floating
                        && arranged
                        && ((nw - cw).abs() > SNAP || (nh - ch).abs() > SNAP)
                    {
                        Action::ToggleFloating.execute(self);
                    }
                    let floating_now = self
                        .clients
                        .get(&handle)
                        .is_some_and(|c| c.is_floating);
                    if self.mons[self.selected_monitor].layout().arrange.is_none()
                        || floating_now
                    {
                        self.resize(handle, cx, cy, nw, nh, true);
                    }
                }
                Some(Event::ButtonRelease(_)) => break,
                _ => {}
            }
        }
        if let Some(c) = self.clients.get(&handle) {
            let (win, w, h, bw) = (c.win, c.w, c.h, c.bw);
            self.xwrapper.warp_pointer(win, w + bw - 1, h + bw - 1);
        }
        self.xwrapper.ungrab_pointer();
        self.xwrapper.drain_events(xlib::EnterWindowMask);

        if let Some(c) = self.clients.get(&handle) {
            let target = self.rect_to_monitor(c.x, c.y, c.w, c.h);
            if target != self.selected_monitor {
                self.sendmon(handle, target);
                self.selected_monitor = target;
                self.focus(None);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_delta_keeps_mfact() {
        assert_eq!(adjusted_mfact(0.55, 0.0), Some(0.55));
    }

    #[test]
    fn delta_round_trips() {
        let up = adjusted_mfact(0.55, 0.05).unwrap();
        let back = adjusted_mfact(up, -0.05).unwrap();
        assert!((back - 0.55).abs() < 1e-6);
    }

    #[test]
    fn arguments_above_one_set_mfact_absolute() {
        assert_eq!(adjusted_mfact(0.55, 1.75), Some(0.75));
    }

    #[test]
    fn out_of_range_results_are_rejected() {
        assert_eq!(adjusted_mfact(0.88, 0.05), None);
        assert_eq!(adjusted_mfact(0.12, -0.05), None);
        assert_eq!(adjusted_mfact(0.5, 1.95), None);
    }
}
