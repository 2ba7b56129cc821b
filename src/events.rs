use x11::xlib;

use crate::actions::Action;
use crate::config::{self, Click};
use crate::state::Dwm;
use crate::xwrapper::{Atom, Net, Window, WITHDRAWN_STATE};

pub fn key_press(state: &mut Dwm, ev: &xlib::XKeyEvent) {
    let keysym = state.xwrapper.keycode_to_keysym(ev.keycode) as u32;
    let nlm = state.numlock_mask;
    let action = config::keys()
        .into_iter()
        .find(|k| {
            keysym == k.keysym
                && state.xwrapper.clean_mask(k.mask, nlm)
                    == state.xwrapper.clean_mask(ev.state, nlm)
        })
        .map(|k| k.action);
    if let Some(action) = action {
        action.execute(state);
    }
}

/// A TagBar binding with a zero mask acts on whichever tag cell was hit.
fn substitute_tag(action: Action, tag: u32) -> Action {
    match action {
        Action::View(0) => Action::View(tag),
        Action::ToggleView(0) => Action::ToggleView(tag),
        Action::Tag(0) => Action::Tag(tag),
        Action::ToggleTag(0) => Action::ToggleTag(tag),
        other => other,
    }
}

pub fn button_press(state: &mut Dwm, ev: &xlib::XButtonEvent) {
    let mut click = Click::RootWin;
    let mut clicked_tag = 0u32;

    // focus the monitor under the click if necessary
    let m = state.window_to_monitor(ev.window);
    if m != state.selected_monitor {
        if let Some(sel) = state.mons[state.selected_monitor].sel {
            state.unfocus(sel, true);
        }
        state.selected_monitor = m;
        state.focus(None);
    }

    if Window(ev.window) == state.mons[state.selected_monitor].bar_window {
        let mut i = 0;
        let mut x = 0;
        while i < config::TAGS.len() {
            x += state.text_width_padded(config::TAGS[i]);
            if ev.x < x {
                break;
            }
            i += 1;
        }
        if i < config::TAGS.len() {
            click = Click::TagBar;
            clicked_tag = 1 << i;
        } else if ev.x < x + state.bar_lt_width {
            click = Click::LtSymbol;
        } else if ev.x
            > state.mons[state.selected_monitor].ww - state.text_width_padded(&state.status_text)
        {
            click = Click::StatusText;
        } else {
            click = Click::WinTitle;
        }
    } else if let Some(handle) = state.window_to_client_handle(ev.window) {
        state.focus(Some(handle));
        click = Click::ClientWin;
    }

    let nlm = state.numlock_mask;
    let action = config::buttons()
        .into_iter()
        .find(|b| {
            b.click == click
                && b.button == ev.button
                && state.xwrapper.clean_mask(b.mask, nlm)
                    == state.xwrapper.clean_mask(ev.state, nlm)
        })
        .map(|b| b.action);
    if let Some(action) = action {
        let action = if click == Click::TagBar {
            substitute_tag(action, clicked_tag)
        } else {
            action
        };
        action.execute(state);
    }
}

pub fn client_message(state: &mut Dwm, ev: &xlib::XClientMessageEvent) {
    let Some(handle) = state.window_to_client_handle(ev.window) else {
        return;
    };
    let net_wm_state = state.xwrapper.atoms.get(Atom::Net(Net::WMState));
    let net_fullscreen = state.xwrapper.atoms.get(Atom::Net(Net::WMFullscreen));
    let net_active = state.xwrapper.atoms.get(Atom::Net(Net::ActiveWindow));

    if ev.message_type == net_wm_state {
        if ev.data.get_long(1) as xlib::Atom == net_fullscreen
            || ev.data.get_long(2) as xlib::Atom == net_fullscreen
        {
            // _NET_WM_STATE_ADD / _NET_WM_STATE_TOGGLE
            let is_fullscreen = state
                .clients
                .get(&handle)
                .is_some_and(|c| c.is_fullscreen);
            let fullscreen =
                ev.data.get_long(0) == 1 || (ev.data.get_long(0) == 2 && !is_fullscreen);
            state.set_fullscreen(handle, fullscreen);
        }
    } else if ev.message_type == net_active {
        // an activation request for a hidden client drags its tags into view
        let Some(c) = state.clients.get(&handle) else {
            return;
        };
        let mon_idx = c.monitor_idx;
        if !c.is_visible_on(&state.mons[mon_idx]) {
            let tags = c.tags;
            let mon = &mut state.mons[mon_idx];
            mon.seltags ^= 1;
            mon.tagset[mon.seltags as usize] = tags;
        }
        state.pop(handle);
    }
}

pub fn configure_request(state: &mut Dwm, ev: &xlib::XConfigureRequestEvent) {
    if let Some(handle) = state.window_to_client_handle(ev.window) {
        let floating_layout = state.mons[state.selected_monitor].layout().arrange.is_none();
        if ev.value_mask & xlib::CWBorderWidth as u64 != 0 {
            if let Some(c) = state.clients.get_mut(&handle) {
                c.bw = ev.border_width;
            }
        } else if state
            .clients
            .get(&handle)
            .is_some_and(|c| c.is_floating)
            || floating_layout
        {
            let Some(mon_idx) = state.clients.get(&handle).map(|c| c.monitor_idx) else {
                return;
            };
            let (mx, my, mw, mh) = {
                let m = &state.mons[mon_idx];
                (m.mx, m.my, m.mw, m.mh)
            };
            let Some(c) = state.clients.get_mut(&handle) else {
                return;
            };
            if ev.value_mask & xlib::CWX as u64 != 0 {
                c.oldx = c.x;
                c.x = mx + ev.x;
            }
            if ev.value_mask & xlib::CWY as u64 != 0 {
                c.oldy = c.y;
                c.y = my + ev.y;
            }
            if ev.value_mask & xlib::CWWidth as u64 != 0 {
                c.oldw = c.w;
                c.w = ev.width;
            }
            if ev.value_mask & xlib::CWHeight as u64 != 0 {
                c.oldh = c.h;
                c.h = ev.height;
            }
            if c.x + c.w > mx + mw && c.is_floating {
                // center in x direction
                c.x = mx + (mw / 2 - c.total_w() / 2);
            }
            if c.y + c.h > my + mh && c.is_floating {
                // center in y direction
                c.y = my + (mh / 2 - c.total_h() / 2);
            }
            let move_only = ev.value_mask & (xlib::CWX | xlib::CWY) as u64 != 0
                && ev.value_mask & (xlib::CWWidth | xlib::CWHeight) as u64 == 0;
            let (win, x, y, w, h) = (c.win, c.x, c.y, c.w, c.h);
            let visible = state
                .clients
                .get(&handle)
                .is_some_and(|c| c.is_visible_on(&state.mons[mon_idx]));
            if move_only {
                state.send_configure(handle);
            }
            if visible {
                state.xwrapper.move_resize_window(win, x, y, w as u32, h as u32);
            }
        } else {
            state.send_configure(handle);
        }
    } else {
        state.xwrapper.configure_forward(ev);
    }
    state.xwrapper.sync(false);
}

/// A root ConfigureNotify means the screen itself changed; rebuild the
/// monitor topology and every bar.
pub fn configure_notify(state: &mut Dwm, ev: &xlib::XConfigureEvent) {
    if Window(ev.window) != state.root {
        return;
    }
    let dirty = state.screen_width != ev.width || state.screen_height != ev.height;
    state.screen_width = ev.width;
    state.screen_height = ev.height;
    if state.update_geometry() || dirty {
        log::info!(
            "screen changed to {}x{}, rebuilding bars",
            ev.width,
            ev.height
        );
        state
            .xwrapper
            .resize_drawable(state.screen_width as u32, state.bar_height as u32);
        state.update_bars();
        for i in 0..state.mons.len() {
            let (barwin, wx, by, ww) = {
                let m = &state.mons[i];
                (m.bar_window, m.wx, m.by, m.ww)
            };
            state
                .xwrapper
                .move_resize_window(barwin, wx, by, ww as u32, state.bar_height as u32);
        }
        state.focus(None);
        state.arrange(None);
    }
}

pub fn destroy_notify(state: &mut Dwm, ev: &xlib::XDestroyWindowEvent) {
    if let Some(handle) = state.window_to_client_handle(ev.window) {
        state.unmanage(handle, true);
    }
}

pub fn unmap_notify(state: &mut Dwm, ev: &xlib::XUnmapEvent) {
    let Some(handle) = state.window_to_client_handle(ev.window) else {
        return;
    };
    if ev.send_event != 0 {
        // a synthetic unmap is the ICCCM way of asking for Withdrawn
        if let Some(win) = state.clients.get(&handle).map(|c| c.win) {
            state.xwrapper.set_client_state(win, WITHDRAWN_STATE);
        }
    } else {
        state.unmanage(handle, false);
    }
}

pub fn enter_notify(state: &mut Dwm, ev: &xlib::XCrossingEvent) {
    if (ev.mode != xlib::NotifyNormal || ev.detail == xlib::NotifyInferior)
        && Window(ev.window) != state.root
    {
        return;
    }
    let handle = state.window_to_client_handle(ev.window);
    let mon_idx = match handle.and_then(|h| state.clients.get(&h)) {
        Some(c) => c.monitor_idx,
        None => state.window_to_monitor(ev.window),
    };
    if mon_idx != state.selected_monitor {
        if let Some(sel) = state.mons[state.selected_monitor].sel {
            state.unfocus(sel, true);
        }
        state.selected_monitor = mon_idx;
    } else if handle.is_none() || handle == state.mons[state.selected_monitor].sel {
        return;
    }
    state.focus(handle);
}

pub fn expose(state: &mut Dwm, ev: &xlib::XExposeEvent) {
    if ev.count == 0 {
        let m = state.window_to_monitor(ev.window);
        state.draw_bar(m);
    }
}

/// Some clients acquire focus on their own; push it back where it belongs.
pub fn focus_in(state: &mut Dwm, ev: &xlib::XFocusChangeEvent) {
    if let Some(sel) = state.mons[state.selected_monitor].sel {
        if state.clients.get(&sel).is_some_and(|c| c.win.0 != ev.window) {
            state.set_focus(sel);
        }
    }
}

pub fn mapping_notify(state: &mut Dwm, ev: &mut xlib::XMappingEvent) {
    state.xwrapper.refresh_keyboard_mapping(ev);
    if ev.request == xlib::MappingKeyboard {
        state.grab_keys();
    }
}

pub fn map_request(state: &mut Dwm, ev: &xlib::XMapRequestEvent) {
    let Some(wa) = state.xwrapper.get_window_attributes(Window(ev.window)) else {
        return;
    };
    if wa.override_redirect != 0 {
        return;
    }
    if state.window_to_client_handle(ev.window).is_none() {
        state.manage(ev.window, &wa);
    }
}

/// Pointer crossings over the root switch the selected monitor.
pub fn motion_notify(state: &mut Dwm, ev: &xlib::XMotionEvent) {
    if Window(ev.window) != state.root {
        return;
    }
    let m = state.rect_to_monitor(ev.x_root, ev.y_root, 1, 1);
    if state.motion_mon.is_some_and(|prev| m != prev) {
        if let Some(sel) = state.mons[state.selected_monitor].sel {
            state.unfocus(sel, true);
        }
        state.selected_monitor = m;
        state.focus(None);
    }
    state.motion_mon = Some(m);
}

pub fn property_notify(state: &mut Dwm, ev: &xlib::XPropertyEvent) {
    if Window(ev.window) == state.root && ev.atom == xlib::XA_WM_NAME {
        state.update_status();
        return;
    }
    if ev.state == xlib::PropertyDelete {
        return;
    }
    let Some(handle) = state.window_to_client_handle(ev.window) else {
        return;
    };

    match ev.atom {
        xlib::XA_WM_TRANSIENT_FOR => {
            let floating = state.clients.get(&handle).is_some_and(|c| c.is_floating);
            let win = state.clients.get(&handle).map(|c| c.win);
            if !floating {
                let trans = win.and_then(|w| state.xwrapper.get_transient_for_hint(w));
                if trans.is_some_and(|t| state.window_to_client_handle(t.0).is_some()) {
                    let mut arrange_mon = None;
                    if let Some(c) = state.clients.get_mut(&handle) {
                        c.is_floating = true;
                        arrange_mon = Some(c.monitor_idx);
                    }
                    if let Some(mi) = arrange_mon {
                        state.arrange(Some(mi));
                    }
                }
            }
        }
        xlib::XA_WM_NORMAL_HINTS => state.update_size_hints(handle),
        xlib::XA_WM_HINTS => {
            state.update_wm_hints(handle);
            state.draw_bars();
        }
        _ => {}
    }

    if ev.atom == xlib::XA_WM_NAME
        || ev.atom == state.xwrapper.atoms.get(Atom::Net(Net::WMName))
    {
        state.update_title(handle);
        if let Some(mi) = state.clients.get(&handle).map(|c| c.monitor_idx) {
            if state.mons[mi].sel == Some(handle) {
                state.draw_bar(mi);
            }
        }
    }
    if ev.atom == state.xwrapper.atoms.get(Atom::Net(Net::WMWindowType)) {
        state.update_window_type(handle);
    }
}
