use std::collections::HashMap;

use crate::client::{Client, ClientHandle};
use crate::config;
use crate::layouts::{Layout, LAYOUTS};
use crate::xwrapper::Window;

/// One physical output. Owns two orderings over the same clients: `clients`
/// in creation order (layouts iterate it for stable placement) and `stack`
/// in most-recently-focused order (focus policy walks it).
#[derive(Debug, Clone)]
pub struct Monitor {
    pub lt_symbol: String,
    pub mfact: f32,
    pub nmaster: i32,
    pub num: i32,
    /// bar y position
    pub by: i32,
    /// screen geometry
    pub mx: i32,
    pub my: i32,
    pub mw: i32,
    pub mh: i32,
    /// window area (screen minus bar)
    pub wx: i32,
    pub wy: i32,
    pub ww: i32,
    pub wh: i32,
    pub seltags: u32,
    pub sellt: u32,
    pub tagset: [u32; 2],
    pub show_bar: bool,
    pub top_bar: bool,
    pub clients: Vec<ClientHandle>,
    pub stack: Vec<ClientHandle>,
    pub sel: Option<ClientHandle>,
    pub bar_window: Window,
    pub lt: [&'static Layout; 2],
}

impl Default for Monitor {
    fn default() -> Self {
        Monitor {
            lt_symbol: LAYOUTS[0].symbol.to_string(),
            mfact: config::MFACT,
            nmaster: config::NMASTER,
            num: 0,
            by: 0,
            mx: 0,
            my: 0,
            mw: 0,
            mh: 0,
            wx: 0,
            wy: 0,
            ww: 0,
            wh: 0,
            seltags: 0,
            sellt: 0,
            tagset: [1, 1],
            show_bar: config::SHOW_BAR,
            top_bar: config::TOP_BAR,
            clients: Vec::new(),
            stack: Vec::new(),
            sel: None,
            bar_window: Window(0),
            lt: [&LAYOUTS[0], &LAYOUTS[1 % LAYOUTS.len()]],
        }
    }
}

impl Monitor {
    pub fn layout(&self) -> &'static Layout {
        self.lt[self.sellt as usize]
    }

    /// Prepend to the client list (creation order).
    pub fn attach(&mut self, handle: ClientHandle) {
        self.clients.insert(0, handle);
    }

    pub fn detach(&mut self, handle: ClientHandle) {
        self.clients.retain(|&h| h != handle);
    }

    /// Prepend to the focus stack (MRU order).
    pub fn attach_stack(&mut self, handle: ClientHandle) {
        self.stack.insert(0, handle);
    }

    /// Remove from the focus stack. If the removed client was selected, the
    /// first visible survivor takes its place.
    pub fn detach_stack(&mut self, handle: ClientHandle, clients: &HashMap<ClientHandle, Client>) {
        self.stack.retain(|&h| h != handle);
        if self.sel == Some(handle) {
            self.sel = self
                .stack
                .iter()
                .find(|h| clients.get(h).is_some_and(|c| c.is_visible_on(self)))
                .copied();
        }
    }

    /// Swap to the named tagset. Viewing the current set is a no-op; a zero
    /// mask flips back to the previous tagset. Returns whether anything
    /// changed.
    pub fn view(&mut self, mask: u32) -> bool {
        if (mask & config::TAG_MASK) == self.tagset[self.seltags as usize] {
            return false;
        }
        self.seltags ^= 1;
        if mask & config::TAG_MASK != 0 {
            self.tagset[self.seltags as usize] = mask & config::TAG_MASK;
        }
        true
    }

    /// XOR tags into the current view; refuses to empty it. Returns whether
    /// anything changed.
    pub fn toggle_view(&mut self, mask: u32) -> bool {
        let newtagset = self.tagset[self.seltags as usize] ^ (mask & config::TAG_MASK);
        if newtagset == 0 {
            return false;
        }
        self.tagset[self.seltags as usize] = newtagset;
        true
    }

    /// Area of the intersection between a rectangle and this monitor's
    /// window area.
    pub fn intersect_area(&self, x: i32, y: i32, w: i32, h: i32) -> i32 {
        ((x + w).min(self.wx + self.ww) - x.max(self.wx)).max(0)
            * ((y + h).min(self.wy + self.wh) - y.max(self.wy)).max(0)
    }

    /// Recompute the window area and bar position from the screen geometry.
    pub fn update_bar_pos(&mut self, bh: i32) {
        self.wy = self.my;
        self.wh = self.mh;
        if self.show_bar {
            self.wh -= bh;
            self.by = if self.top_bar { self.wy } else { self.wy + self.wh };
            if self.top_bar {
                self.wy += bh;
            }
        } else {
            self.by = -bh;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Client;

    fn client_on(tags: u32) -> Client {
        let mut c = Client::new(Window(0), 0, 0, 100, 100, 0);
        c.tags = tags;
        c
    }

    fn insert(clients: &mut HashMap<ClientHandle, Client>, id: u64, tags: u32) -> ClientHandle {
        let handle = ClientHandle(id);
        let mut c = client_on(tags);
        c.win = Window(id);
        clients.insert(handle, c);
        handle
    }

    #[test]
    fn attach_prepends_to_both_lists() {
        let mut clients = HashMap::new();
        let mut mon = Monitor::default();
        let a = insert(&mut clients, 1, 1);
        let b = insert(&mut clients, 2, 1);
        for h in [a, b] {
            mon.attach(h);
            mon.attach_stack(h);
        }
        assert_eq!(mon.clients, vec![b, a]);
        assert_eq!(mon.stack, vec![b, a]);
    }

    #[test]
    fn detach_removes_from_exactly_one_list() {
        let mut clients = HashMap::new();
        let mut mon = Monitor::default();
        let a = insert(&mut clients, 1, 1);
        let b = insert(&mut clients, 2, 1);
        for h in [a, b] {
            mon.attach(h);
            mon.attach_stack(h);
        }
        mon.detach(a);
        assert_eq!(mon.clients, vec![b]);
        assert_eq!(mon.stack, vec![b, a]);
        mon.detach_stack(a, &clients);
        assert_eq!(mon.stack, vec![b]);
    }

    #[test]
    fn detach_stack_reselects_first_visible_survivor() {
        let mut clients = HashMap::new();
        let mut mon = Monitor::default();
        mon.tagset = [1, 1];
        let hidden = insert(&mut clients, 1, 2);
        let visible = insert(&mut clients, 2, 1);
        let selected = insert(&mut clients, 3, 1);
        for h in [visible, hidden, selected] {
            mon.attach(h);
            mon.attach_stack(h);
        }
        mon.sel = Some(selected);
        mon.detach_stack(selected, &clients);
        // the hidden client sits above `visible` in the stack but is skipped
        assert_eq!(mon.sel, Some(visible));
    }

    #[test]
    fn detach_stack_clears_selection_when_nothing_is_visible() {
        let mut clients = HashMap::new();
        let mut mon = Monitor::default();
        let only = insert(&mut clients, 1, 1);
        mon.attach(only);
        mon.attach_stack(only);
        mon.sel = Some(only);
        mon.detach_stack(only, &clients);
        assert_eq!(mon.sel, None);
    }

    #[test]
    fn view_twice_restores_the_previous_view() {
        let mut mon = Monitor::default();
        mon.tagset = [1, 1 << 5];
        mon.seltags = 0;
        assert!(mon.view(1 << 3));
        assert_eq!(mon.seltags, 1);
        assert_eq!(mon.tagset[1], 1 << 3);
        assert!(mon.view(1));
        assert_eq!(mon.seltags, 0);
        assert_eq!(mon.tagset[mon.seltags as usize], 1);
    }

    #[test]
    fn viewing_the_current_tagset_is_a_no_op() {
        let mut mon = Monitor::default();
        mon.tagset = [1 << 2, 1];
        mon.seltags = 0;
        assert!(!mon.view(1 << 2));
        assert_eq!(mon.seltags, 0);
    }

    #[test]
    fn view_zero_flips_to_the_previous_tagset() {
        let mut mon = Monitor::default();
        mon.tagset = [1, 1 << 4];
        mon.seltags = 0;
        assert!(mon.view(0));
        assert_eq!(mon.seltags, 1);
        assert_eq!(mon.tagset, [1, 1 << 4]);
    }

    #[test]
    fn toggle_view_refuses_to_empty_the_tagset() {
        let mut mon = Monitor::default();
        mon.tagset = [1 << 1, 1];
        mon.seltags = 0;
        assert!(!mon.toggle_view(1 << 1));
        assert_eq!(mon.tagset[0], 1 << 1);
        assert!(mon.toggle_view(1 << 2));
        assert_eq!(mon.tagset[0], (1 << 1) | (1 << 2));
    }

    #[test]
    fn intersect_area_measures_the_overlap() {
        let mut mon = Monitor::default();
        mon.wx = 0;
        mon.wy = 0;
        mon.ww = 1920;
        mon.wh = 1080;
        assert_eq!(mon.intersect_area(0, 0, 10, 10), 100);
        assert_eq!(mon.intersect_area(1910, 1070, 20, 20), 100);
        assert_eq!(mon.intersect_area(-5, -5, 5, 5), 0);
        assert_eq!(mon.intersect_area(2000, 0, 10, 10), 0);
    }

    #[test]
    fn bar_position_carves_the_work_area() {
        let mut mon = Monitor::default();
        mon.my = 0;
        mon.mh = 1080;
        mon.show_bar = true;
        mon.top_bar = true;
        mon.update_bar_pos(18);
        assert_eq!((mon.by, mon.wy, mon.wh), (0, 18, 1062));

        mon.top_bar = false;
        mon.update_bar_pos(18);
        assert_eq!((mon.by, mon.wy, mon.wh), (1062, 0, 1062));

        mon.show_bar = false;
        mon.update_bar_pos(18);
        assert_eq!((mon.by, mon.wy, mon.wh), (-18, 0, 1080));
    }
}
