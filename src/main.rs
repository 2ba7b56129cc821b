use std::fs::{create_dir_all, File, OpenOptions};
use std::io::Write;
use std::panic;
use std::path::PathBuf;
use std::sync::LazyLock;

use simplelog::{CombinedLogger, Config, LevelFilter, WriteLogger};
use x11::xlib;

mod actions;
mod bar;
mod client;
mod colour;
mod command;
mod config;
mod error;
mod events;
mod ivec2;
mod layouts;
mod monitor;
mod state;
mod utils;
mod xwrapper;

use client::{Client, ClientHandle};
use colour::Colour;
use state::Dwm;
use xwrapper::{Atom, Event, Net, Window, ICONIC_STATE, NORMAL_STATE, WITHDRAWN_STATE};

static DATA_PATH: LazyLock<PathBuf> = LazyLock::new(|| {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("dwm")
});
static LOG_PATH: LazyLock<PathBuf> = LazyLock::new(|| DATA_PATH.join("dwm.log"));

impl Dwm {
    fn run(&mut self) {
        self.xwrapper.sync(false);
        while self.running {
            let Some(xev) = self.xwrapper.next_event() else {
                break;
            };
            if let Some(ev) = Event::decode(xev) {
                self.handle_event(ev);
            }
        }
    }

    fn handle_event(&mut self, ev: Event) {
        match ev {
            Event::ButtonPress(e) => events::button_press(self, &e),
            Event::ButtonRelease(_) => {}
            Event::ClientMessage(e) => events::client_message(self, &e),
            Event::ConfigureRequest(e) => events::configure_request(self, &e),
            Event::ConfigureNotify(e) => events::configure_notify(self, &e),
            Event::DestroyNotify(e) => events::destroy_notify(self, &e),
            Event::EnterNotify(e) => events::enter_notify(self, &e),
            Event::Expose(e) => events::expose(self, &e),
            Event::FocusIn(e) => events::focus_in(self, &e),
            Event::KeyPress(e) => events::key_press(self, &e),
            Event::MappingNotify(mut e) => events::mapping_notify(self, &mut e),
            Event::MapRequest(e) => events::map_request(self, &e),
            Event::MotionNotify(e) => events::motion_notify(self, &e),
            Event::PropertyNotify(e) => events::property_notify(self, &e),
            Event::UnmapNotify(e) => events::unmap_notify(self, &e),
        }
    }

    pub fn window_to_client_handle(&self, w: xlib::Window) -> Option<ClientHandle> {
        let handle = ClientHandle(w);
        self.clients.contains_key(&handle).then_some(handle)
    }

    fn apply_rules(&mut self, handle: ClientHandle) {
        let Some((win, name, mon_idx)) = self
            .clients
            .get(&handle)
            .map(|c| (c.win, c.name.clone(), c.monitor_idx))
        else {
            return;
        };
        let (instance, class) = self.xwrapper.get_class_hint(win).unwrap_or_default();
        let class = if class.is_empty() { "broken".to_string() } else { class };
        let instance = if instance.is_empty() { "broken".to_string() } else { instance };

        let m = config::resolve_rules(&class, &instance, &name);
        let target_mon = if m.monitor >= 0 && (m.monitor as usize) < self.mons.len() {
            m.monitor as usize
        } else {
            mon_idx
        };
        let tags = if m.tags != 0 {
            m.tags
        } else {
            let mon = &self.mons[target_mon];
            mon.tagset[mon.seltags as usize]
        };
        if let Some(c) = self.clients.get_mut(&handle) {
            c.is_floating = m.is_floating;
            c.monitor_idx = target_mon;
            c.tags = tags;
        }
        log::info!(
            "rules for '{}' ({}, {}): tags {:#x}, floating {}, monitor {}",
            name,
            class,
            instance,
            tags,
            m.is_floating,
            target_mon
        );
    }

    pub fn manage(&mut self, w: xlib::Window, wa: &xlib::XWindowAttributes) {
        let handle = ClientHandle(w);
        let win = Window(w);
        let mut client = Client::new(win, wa.x, wa.y, wa.width, wa.height, wa.border_width);
        client.monitor_idx = self.selected_monitor;

        let trans = self.xwrapper.get_transient_for_hint(win);
        let parent = trans.and_then(|t| self.window_to_client_handle(t.0));
        if let Some(p) = parent.and_then(|p| self.clients.get(&p)) {
            client.monitor_idx = p.monitor_idx;
            client.tags = p.tags;
        }
        self.clients.insert(handle, client);
        self.update_title(handle);
        if parent.is_none() {
            self.apply_rules(handle);
        }

        // keep the window on its monitor, and below a top bar
        let mon_idx = self.clients[&handle].monitor_idx;
        let (mx, my, mw, mh, wx, ww, by) = {
            let m = &self.mons[mon_idx];
            (m.mx, m.my, m.mw, m.mh, m.wx, m.ww, m.by)
        };
        let bh = self.bar_height;
        if let Some(c) = self.clients.get_mut(&handle) {
            if c.x + c.total_w() > mx + mw {
                c.x = mx + mw - c.total_w();
            }
            if c.y + c.total_h() > my + mh {
                c.y = my + mh - c.total_h();
            }
            c.x = c.x.max(mx);
            // only fix the y offset if the client center might cover the bar
            let covers_bar = by == my && c.x + c.w / 2 >= wx && c.x + c.w / 2 < wx + ww;
            c.y = c.y.max(if covers_bar { bh } else { my });
            c.bw = config::BORDER_PX;
        }

        self.xwrapper.set_border_width(win, config::BORDER_PX);
        self.xwrapper
            .set_window_border_color(win, Colour::NormBorder);
        // propagates the border width even if the size doesn't change
        self.send_configure(handle);
        self.update_window_type(handle);
        self.update_size_hints(handle);
        self.update_wm_hints(handle);
        self.xwrapper.select_input(
            win,
            xlib::EnterWindowMask
                | xlib::FocusChangeMask
                | xlib::PropertyChangeMask
                | xlib::StructureNotifyMask,
        );
        self.grab_buttons(handle, false);

        let mut raise = false;
        if let Some(c) = self.clients.get_mut(&handle) {
            if !c.is_floating {
                c.is_floating = trans.is_some() || c.is_fixed;
                c.old_state = c.is_floating;
            }
            raise = c.is_floating;
        }
        if raise {
            self.xwrapper.raise_window(win);
        }

        let mon_idx = self.clients[&handle].monitor_idx;
        self.mons[mon_idx].attach(handle);
        self.mons[mon_idx].attach_stack(handle);
        self.xwrapper.append_window_prop(
            self.root,
            self.xwrapper.atoms.get(Atom::Net(Net::ClientList)),
            win,
        );
        // some windows require a move off-screen before the first map
        if let Some(c) = self.clients.get(&handle) {
            self.xwrapper.move_resize_window(
                c.win,
                c.x + 2 * self.screen_width,
                c.y,
                c.w as u32,
                c.h as u32,
            );
        }
        self.xwrapper.set_client_state(win, NORMAL_STATE);
        if mon_idx == self.selected_monitor {
            if let Some(sel) = self.mons[mon_idx].sel {
                self.unfocus(sel, false);
            }
        }
        self.mons[mon_idx].sel = Some(handle);
        self.arrange(Some(mon_idx));
        self.xwrapper.map_window(win);
        self.focus(None);
        log::info!("managed window {:#x} on monitor {}", w, mon_idx);
    }

    pub fn unmanage(&mut self, handle: ClientHandle, destroyed: bool) {
        let Some((mon_idx, win, old_bw)) = self
            .clients
            .get(&handle)
            .map(|c| (c.monitor_idx, c.win, c.old_bw))
        else {
            return;
        };
        self.mons[mon_idx].detach(handle);
        self.mons[mon_idx].detach_stack(handle, &self.clients);
        if !destroyed {
            // the server grab avoids races with a dying client
            self.xwrapper.grab_server();
            self.xwrapper.set_ignore_error_handler();
            self.xwrapper.set_border_width(win, old_bw);
            self.xwrapper.ungrab_buttons(win);
            self.xwrapper.set_client_state(win, WITHDRAWN_STATE);
            self.xwrapper.sync(false);
            self.xwrapper.set_default_error_handler();
            self.xwrapper.ungrab_server();
        }
        self.clients.remove(&handle);
        self.focus(None);
        self.update_client_list();
        self.arrange(Some(mon_idx));
        log::info!("unmanaged window {:#x}", win.0);
    }

    /// Adopt windows that were already mapped when the manager started:
    /// ordinary windows first, transients once their parents exist.
    fn scan(&mut self) {
        let Some(wins) = self.xwrapper.query_tree(self.root) else {
            return;
        };
        for &win in &wins {
            let Some(wa) = self.xwrapper.get_window_attributes(win) else {
                continue;
            };
            if wa.override_redirect != 0 || self.xwrapper.get_transient_for_hint(win).is_some() {
                continue;
            }
            if wa.map_state == xlib::IsViewable
                || self.xwrapper.get_wm_state(win) == ICONIC_STATE
            {
                self.manage(win.0, &wa);
            }
        }
        for &win in &wins {
            let Some(wa) = self.xwrapper.get_window_attributes(win) else {
                continue;
            };
            if self.xwrapper.get_transient_for_hint(win).is_some()
                && (wa.map_state == xlib::IsViewable
                    || self.xwrapper.get_wm_state(win) == ICONIC_STATE)
            {
                self.manage(win.0, &wa);
            }
        }
    }
}

fn setup_logger() {
    if let Err(e) = create_dir_all(&*DATA_PATH) {
        eprintln!("dwm: failed to create log directory: {}", e);
        return;
    }
    match File::create(&*LOG_PATH) {
        Ok(file) => {
            let _ = CombinedLogger::init(vec![WriteLogger::new(
                LevelFilter::Info,
                Config::default(),
                file,
            )]);
        }
        Err(e) => eprintln!("dwm: failed to create log file at {:?}: {}", &*LOG_PATH, e),
    }
}

/// Panics land in the log file; a crashed window manager has no terminal to
/// report to.
fn setup_panic_hook() {
    let log_path = LOG_PATH.clone();
    panic::set_hook(Box::new(move |panic_info| {
        let msg = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown payload".to_string()
        };
        let location = panic_info
            .location()
            .map(|l| format!(" at {}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_default();
        let full = format!("panic: {}{}", msg, location);

        eprintln!("dwm: {}", full);
        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(&log_path) {
            let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
            let _ = writeln!(file, "[{}] [ERROR] {}", timestamp, full);
        }
    }));
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [] => {}
        [v] if v == "-v" => {
            eprintln!("dwm-{}", env!("CARGO_PKG_VERSION"));
            std::process::exit(1);
        }
        _ => {
            eprintln!("usage: dwm [-v]");
            std::process::exit(1);
        }
    }

    setup_logger();
    setup_panic_hook();
    log::info!("starting dwm-{}", env!("CARGO_PKG_VERSION"));

    match Dwm::new() {
        Ok(mut dwm) => {
            dwm.scan();
            dwm.run();
        }
        Err(e) => {
            log::error!("{}", e);
            eprintln!("dwm: {}", e);
            std::process::exit(1);
        }
    }
}
