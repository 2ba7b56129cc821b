use crate::colour::{scheme, Colour};
use crate::config;
use crate::ivec2::{ivec2, IVec2};
use crate::state::Dwm;

impl Dwm {
    /// Width of a text cell on the bar: the rendered text plus padding.
    pub fn text_width_padded(&self, text: &str) -> i32 {
        self.xwrapper.text_width(text) as i32 + self.lr_padding
    }

    pub fn draw_bars(&mut self) {
        for i in 0..self.mons.len() {
            self.draw_bar(i);
        }
    }

    pub fn draw_bar(&mut self, mon_idx: usize) {
        let bh = self.bar_height;
        let lpad = (self.lr_padding / 2) as u32;
        let Some(mon) = self.mons.get(mon_idx) else {
            return;
        };

        let mut occ = 0u32;
        let mut urg = 0u32;
        for h in &mon.clients {
            if let Some(c) = self.clients.get(h) {
                occ |= c.tags;
                if c.is_urgent {
                    urg |= c.tags;
                }
            }
        }

        let barwin = mon.bar_window;
        let bar_wh = ivec2(mon.ww, bh);
        let tagset = mon.tagset[mon.seltags as usize];
        let lt_symbol = mon.lt_symbol.clone();
        let is_selected_mon = mon_idx == self.selected_monitor;
        let sel = mon.sel.and_then(|h| self.clients.get(&h));
        let sel_tags = sel.map_or(0, |c| c.tags);
        let sel_info = sel.map(|c| (c.name.clone(), c.is_fixed, c.is_floating));

        // small occupancy square in the tag corner
        let box_wh = {
            let dx = (self.xwrapper.get_font_height() as i32 + 2) / 4;
            ivec2(dx, dx)
        };

        let mut pos = ivec2(0, 0);
        for (i, tag) in config::TAGS.iter().enumerate() {
            let tag_wh = ivec2(self.text_width_padded(tag), bh);
            let (bg, fg) = scheme(tagset & (1 << i) != 0, urg & (1 << i) != 0);
            self.xwrapper.rect(bg, pos, tag_wh, true);
            self.xwrapper.text(fg, pos, tag_wh, lpad, tag);
            if occ & (1 << i) != 0 {
                let filled = is_selected_mon && sel_tags & (1 << i) != 0;
                self.xwrapper.rect(fg, pos + ivec2(1, 1), box_wh, filled);
            }
            pos = pos + tag_wh.proj_x();
        }

        let sym_wh = ivec2(self.text_width_padded(&lt_symbol), bh);
        self.bar_lt_width = sym_wh.x;
        self.xwrapper.rect(Colour::NormBg, pos, sym_wh, true);
        self.xwrapper.text(Colour::NormFg, pos, sym_wh, lpad, &lt_symbol);
        pos = pos + sym_wh.proj_x();

        // status is only drawn on the selected monitor
        let mut p_right = ivec2(bar_wh.x, 0);
        if is_selected_mon {
            let status = self.status_text.clone();
            let sw = self.text_width_padded(&status);
            p_right = ivec2((bar_wh.x - sw).max(pos.x), 0);
            let wh_right = ivec2(bar_wh.x - p_right.x, bh);
            self.xwrapper.rect(Colour::NormBg, p_right, wh_right, true);
            self.xwrapper.text(Colour::NormFg, p_right, wh_right, lpad, &status);
        }

        // whatever is left belongs to the window title
        let wh_center: IVec2 = ivec2(p_right.x - pos.x, bh);
        if wh_center.x > bh {
            match sel_info {
                Some((name, fixed, floating)) => {
                    let (bg, fg) = scheme(is_selected_mon, false);
                    self.xwrapper.rect(bg, pos, wh_center, true);
                    self.xwrapper.text(fg, pos, wh_center, lpad, &name);
                    if fixed {
                        self.xwrapper.rect(fg, pos + ivec2(1, 1), box_wh, true);
                    } else if floating {
                        self.xwrapper.rect(fg, pos + ivec2(1, 1), box_wh, false);
                    }
                }
                None => {
                    self.xwrapper.rect(Colour::NormBg, pos, wh_center, true);
                }
            }
        }

        self.xwrapper
            .map_drawable(barwin, 0, 0, bar_wh.x as u32, bar_wh.y as u32);
    }
}
