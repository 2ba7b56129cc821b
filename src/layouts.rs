use std::collections::HashMap;

use crate::client::{resize_geom, Client, ClientHandle, ResizeCtx};
use crate::monitor::Monitor;

/// Which arranger a layout runs. Kept as a variant rather than a function
/// pointer so the resize gap policy can ask "is this monocle" without
/// comparing addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrange {
    Tile,
    Monocle,
    BStack,
    BStackHoriz,
}

#[derive(Debug)]
pub struct Layout {
    pub symbol: &'static str,
    pub arrange: Option<Arrange>,
}

pub static LAYOUTS: [Layout; 5] = [
    Layout {
        symbol: "[]=",
        arrange: Some(Arrange::Tile),
    },
    Layout {
        symbol: "><>",
        arrange: None,
    },
    Layout {
        symbol: "[M]",
        arrange: Some(Arrange::Monocle),
    },
    Layout {
        symbol: "TTT",
        arrange: Some(Arrange::BStack),
    },
    Layout {
        symbol: "===",
        arrange: Some(Arrange::BStackHoriz),
    },
];

/// The monitor's clients in creation order, skipping floating and invisible
/// ones. Every arranger iterates this.
pub fn tiled_clients(
    clients: &HashMap<ClientHandle, Client>,
    mon: &Monitor,
) -> Vec<ClientHandle> {
    mon.clients
        .iter()
        .filter(|h| {
            clients
                .get(h)
                .is_some_and(|c| !c.is_floating && c.is_visible_on(mon))
        })
        .copied()
        .collect()
}

/// Run the given arranger over one monitor's model. Returns the clients
/// whose geometry changed, paired with the border width to put on the wire.
pub fn arrange(
    kind: Arrange,
    clients: &mut HashMap<ClientHandle, Client>,
    mon: &mut Monitor,
    ctx: &ResizeCtx,
) -> Vec<(ClientHandle, i32)> {
    match kind {
        Arrange::Tile => tile(clients, mon, ctx),
        Arrange::Monocle => monocle(clients, mon, ctx),
        Arrange::BStack => bstack(clients, mon, ctx),
        Arrange::BStackHoriz => bstack_horiz(clients, mon, ctx),
    }
}

/// Masters stacked vertically in a left column of `mfact` width, everyone
/// else stacked vertically on the right; heights divide the remainder evenly.
fn tile(
    clients: &mut HashMap<ClientHandle, Client>,
    mon: &mut Monitor,
    ctx: &ResizeCtx,
) -> Vec<(ClientHandle, i32)> {
    let handles = tiled_clients(clients, mon);
    let n = handles.len();
    if n == 0 {
        return Vec::new();
    }
    let nmaster = mon.nmaster.max(0) as usize;

    let mw = if n > nmaster {
        if nmaster > 0 {
            (mon.ww as f32 * mon.mfact) as i32
        } else {
            0
        }
    } else {
        mon.ww
    };

    let mut changed = Vec::new();
    let mut my = 0;
    let mut ty = 0;
    for (i, &handle) in handles.iter().enumerate() {
        let Some(c) = clients.get_mut(&handle) else {
            continue;
        };
        if i < nmaster {
            let h = (mon.wh - my) / (n.min(nmaster) - i) as i32;
            if let Some(bw) = resize_geom(
                c,
                mon.wx,
                mon.wy + my,
                mw - 2 * c.bw,
                h - 2 * c.bw,
                false,
                ctx,
            ) {
                changed.push((handle, bw));
            }
            my += c.total_h();
        } else {
            let h = (mon.wh - ty) / (n - i) as i32;
            if let Some(bw) = resize_geom(
                c,
                mon.wx + mw,
                mon.wy + ty,
                mon.ww - mw - 2 * c.bw,
                h - 2 * c.bw,
                false,
                ctx,
            ) {
                changed.push((handle, bw));
            }
            ty += c.total_h();
        }
    }
    changed
}

/// Every visible client gets the whole window area; the layout symbol
/// becomes the visible-client count.
fn monocle(
    clients: &mut HashMap<ClientHandle, Client>,
    mon: &mut Monitor,
    ctx: &ResizeCtx,
) -> Vec<(ClientHandle, i32)> {
    let n = mon
        .clients
        .iter()
        .filter(|h| clients.get(h).is_some_and(|c| c.is_visible_on(mon)))
        .count();
    if n > 0 {
        mon.lt_symbol = format!("[{}]", n);
    }

    let mut changed = Vec::new();
    for handle in tiled_clients(clients, mon) {
        let Some(c) = clients.get_mut(&handle) else {
            continue;
        };
        if let Some(bw) = resize_geom(
            c,
            mon.wx,
            mon.wy,
            mon.ww - 2 * c.bw,
            mon.wh - 2 * c.bw,
            false,
            ctx,
        ) {
            changed.push((handle, bw));
        }
    }
    changed
}

/// Masters in a row across the top of `mfact` height, the rest sharing the
/// bottom row side by side.
fn bstack(
    clients: &mut HashMap<ClientHandle, Client>,
    mon: &mut Monitor,
    ctx: &ResizeCtx,
) -> Vec<(ClientHandle, i32)> {
    let handles = tiled_clients(clients, mon);
    let n = handles.len();
    if n == 0 {
        return Vec::new();
    }
    let nmaster = mon.nmaster.max(0) as usize;

    let (mh, tw, ty) = if n > nmaster {
        let mh = if nmaster > 0 {
            (mon.mfact * mon.wh as f32) as i32
        } else {
            0
        };
        (mh, mon.ww / (n - nmaster) as i32, mon.wy + mh)
    } else {
        (mon.wh, mon.ww, mon.wy)
    };

    let mut changed = Vec::new();
    let mut mx = 0;
    let mut tx = mon.wx;
    for (i, &handle) in handles.iter().enumerate() {
        let Some(c) = clients.get_mut(&handle) else {
            continue;
        };
        if i < nmaster {
            let w = (mon.ww - mx) / (n.min(nmaster) - i) as i32;
            if let Some(bw) = resize_geom(
                c,
                mon.wx + mx,
                mon.wy,
                w - 2 * c.bw,
                mh - 2 * c.bw,
                false,
                ctx,
            ) {
                changed.push((handle, bw));
            }
            mx += c.total_w();
        } else {
            let h = mon.wh - mh;
            if let Some(bw) =
                resize_geom(c, tx, ty, tw - 2 * c.bw, h - 2 * c.bw, false, ctx)
            {
                changed.push((handle, bw));
            }
            if tw != mon.ww {
                tx += c.total_w();
            }
        }
    }
    changed
}

/// Masters in a row across the top, the rest stacked as full-width rows
/// filling the bottom.
fn bstack_horiz(
    clients: &mut HashMap<ClientHandle, Client>,
    mon: &mut Monitor,
    ctx: &ResizeCtx,
) -> Vec<(ClientHandle, i32)> {
    let handles = tiled_clients(clients, mon);
    let n = handles.len();
    if n == 0 {
        return Vec::new();
    }
    let nmaster = mon.nmaster.max(0) as usize;

    let (mh, th, mut ty) = if n > nmaster {
        let mh = if nmaster > 0 {
            (mon.mfact * mon.wh as f32) as i32
        } else {
            0
        };
        (mh, (mon.wh - mh) / (n - nmaster) as i32, mon.wy + mh)
    } else {
        (mon.wh, mon.wh, mon.wy)
    };

    let mut changed = Vec::new();
    let mut mx = 0;
    for (i, &handle) in handles.iter().enumerate() {
        let Some(c) = clients.get_mut(&handle) else {
            continue;
        };
        if i < nmaster {
            let w = (mon.ww - mx) / (n.min(nmaster) - i) as i32;
            if let Some(bw) = resize_geom(
                c,
                mon.wx + mx,
                mon.wy,
                w - 2 * c.bw,
                mh - 2 * c.bw,
                false,
                ctx,
            ) {
                changed.push((handle, bw));
            }
            mx += c.total_w();
        } else {
            if let Some(bw) = resize_geom(
                c,
                mon.wx,
                ty,
                mon.ww - 2 * c.bw,
                th - 2 * c.bw,
                false,
                ctx,
            ) {
                changed.push((handle, bw));
            }
            if th != mon.wh {
                ty += c.total_h();
            }
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;
    use crate::xwrapper::Window;

    fn setup(n: usize) -> (HashMap<ClientHandle, Client>, Monitor, ResizeCtx) {
        let mut clients = HashMap::new();
        let mut mon = Monitor::default();
        mon.wx = 0;
        mon.wy = 0;
        mon.ww = 1920;
        mon.wh = 1080;
        mon.mfact = 0.55;
        mon.nmaster = 1;
        for id in 1..=n as u64 {
            let handle = ClientHandle(id);
            let mut c = Client::new(Window(id), 0, 0, 100, 100, 0);
            c.tags = 1;
            c.monitor_idx = 0;
            clients.insert(handle, c);
            mon.clients.push(handle);
            mon.stack.push(handle);
        }
        let ctx = ResizeCtx {
            sw: 1920,
            sh: 1098,
            bh: 18,
            wx: 0,
            wy: 0,
            ww: 1920,
            wh: 1080,
            floating_layout: false,
            monocle: false,
            ntiled: n,
        };
        (clients, mon, ctx)
    }

    fn rect(c: &Client) -> (i32, i32, i32, i32) {
        (c.x, c.y, c.w, c.h)
    }

    fn assert_inside_work_area(c: &Client, mon: &Monitor) {
        let gap = config::WINDOW_GAP;
        assert!(c.x >= mon.wx && c.y >= mon.wy, "{:?}", rect(c));
        assert!(c.x + c.w + 2 * c.bw <= mon.wx + mon.ww + gap, "{:?}", rect(c));
        assert!(c.y + c.h + 2 * c.bw <= mon.wy + mon.wh + gap, "{:?}", rect(c));
    }

    fn overlaps(a: &Client, b: &Client) -> bool {
        a.x < b.x + b.w && b.x < a.x + a.w && a.y < b.y + b.h && b.y < a.y + a.h
    }

    #[test]
    fn tile_splits_master_and_stack_with_gaps() {
        let (mut clients, mut mon, ctx) = setup(2);
        tile(&mut clients, &mut mon, &ctx);

        let master = &clients[&ClientHandle(1)];
        let stacked = &clients[&ClientHandle(2)];
        // master column: mfact of 1920 = 1056, inset by gap and border
        assert_eq!(rect(master), (6, 6, 1042, 1066));
        // stack column starts at the master split, same insets
        assert_eq!(rect(stacked), (1062, 6, 850, 1066));
        assert!(!overlaps(master, stacked));
        assert_inside_work_area(master, &mon);
        assert_inside_work_area(stacked, &mon);
    }

    #[test]
    fn tile_with_room_in_the_master_area_uses_the_full_width() {
        let (mut clients, mut mon, ctx) = setup(2);
        mon.nmaster = 3;
        tile(&mut clients, &mut mon, &ctx);

        let top = &clients[&ClientHandle(1)];
        let bottom = &clients[&ClientHandle(2)];
        assert_eq!(rect(top), (6, 6, 1906, 526));
        assert_eq!(rect(bottom), (6, 540, 1906, 532));
        assert!(!overlaps(top, bottom));
    }

    #[test]
    fn tile_divides_the_stack_column_evenly() {
        let (mut clients, mut mon, ctx) = setup(3);
        tile(&mut clients, &mut mon, &ctx);

        let upper = &clients[&ClientHandle(2)];
        let lower = &clients[&ClientHandle(3)];
        assert_eq!(upper.x, lower.x);
        assert!(!overlaps(upper, lower));
        for id in 1..=3 {
            assert_inside_work_area(&clients[&ClientHandle(id)], &mon);
        }
    }

    #[test]
    fn monocle_gives_a_lone_client_the_whole_work_area() {
        let (mut clients, mut mon, mut ctx) = setup(1);
        ctx.monocle = true;
        ctx.ntiled = 1;
        let changed = monocle(&mut clients, &mut mon, &ctx);

        let c = &clients[&ClientHandle(1)];
        assert_eq!(rect(c), (0, 0, 1920, 1080));
        assert_eq!(changed, vec![(ClientHandle(1), 0)]);
        assert_eq!(mon.lt_symbol, "[1]");
    }

    #[test]
    fn monocle_counts_every_visible_client_in_its_symbol() {
        let (mut clients, mut mon, mut ctx) = setup(3);
        ctx.monocle = true;
        monocle(&mut clients, &mut mon, &ctx);
        assert_eq!(mon.lt_symbol, "[3]");
    }

    #[test]
    fn bstack_puts_masters_on_top_and_splits_the_bottom_row() {
        let (mut clients, mut mon, ctx) = setup(3);
        bstack(&mut clients, &mut mon, &ctx);

        let master = &clients[&ClientHandle(1)];
        let left = &clients[&ClientHandle(2)];
        let right = &clients[&ClientHandle(3)];
        assert_eq!(rect(master), (6, 6, 1906, 580));
        assert_eq!(rect(left), (6, 600, 946, 472));
        assert_eq!(rect(right), (960, 600, 946, 472));
        assert!(!overlaps(master, left));
        assert!(!overlaps(left, right));
        for id in 1..=3 {
            assert_inside_work_area(&clients[&ClientHandle(id)], &mon);
        }
    }

    #[test]
    fn bstack_horiz_stacks_the_overflow_as_rows() {
        let (mut clients, mut mon, ctx) = setup(3);
        bstack_horiz(&mut clients, &mut mon, &ctx);

        let master = &clients[&ClientHandle(1)];
        let upper = &clients[&ClientHandle(2)];
        let lower = &clients[&ClientHandle(3)];
        assert_eq!(rect(master), (6, 6, 1906, 580));
        assert_eq!(rect(upper), (6, 600, 1906, 229));
        assert_eq!(rect(lower), (6, 837, 1906, 229));
        assert!(!overlaps(upper, lower));
        assert!(!overlaps(master, upper));
    }

    #[test]
    fn floating_clients_are_not_tiled() {
        let (mut clients, mut mon, ctx) = setup(2);
        let floater = ClientHandle(2);
        clients.get_mut(&floater).unwrap().is_floating = true;
        let before = rect(&clients[&floater]);
        let changed = tile(&mut clients, &mut mon, &ctx);

        assert!(changed.iter().all(|(h, _)| *h != floater));
        assert_eq!(rect(&clients[&floater]), before);
    }

    #[test]
    fn hidden_clients_are_not_tiled() {
        let (mut clients, mut mon, ctx) = setup(2);
        let hidden = ClientHandle(2);
        clients.get_mut(&hidden).unwrap().tags = 1 << 5;
        let changed = tile(&mut clients, &mut mon, &ctx);
        assert!(changed.iter().all(|(h, _)| *h != hidden));
    }
}
