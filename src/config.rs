use x11::{keysym, xlib};

use crate::actions::Action;
use crate::command::Command;
use crate::layouts::LAYOUTS;

/* appearance */
pub const BORDER_PX: i32 = 1;
pub const SNAP: i32 = 32;
pub const WINDOW_GAP: i32 = 6;
pub const SHOW_BAR: bool = true;
pub const TOP_BAR: bool = true;
pub const FONTS: [&str; 1] = ["monospace:size=10"];

/* layout */
pub const MFACT: f32 = 0.55;
pub const NMASTER: i32 = 1;
/// respect size hints in tiled resizals
pub const RESIZE_HINTS: bool = true;
/// don't warp the pointer onto dialogs and notifications
pub const WARP_IGNORE_HINTED: bool = true;

/* tagging */
pub const TAGS: [&str; 9] = ["1", "2", "3", "4", "5", "6", "7", "8", "9"];
pub const TAG_MASK: u32 = (1 << TAGS.len()) - 1;
const _: () = assert!(TAGS.len() < 32, "tag mask must fit an u32");

pub const MODKEY: u32 = xlib::Mod4Mask;

pub struct Rule {
    pub class: Option<&'static str>,
    pub instance: Option<&'static str>,
    pub title: Option<&'static str>,
    pub tags: u32,
    pub is_floating: bool,
    pub monitor: i32,
}

/* class, instance and title are matched as substrings; every matching rule
 * is applied, later rules winning */
pub const RULES: [Rule; 2] = [
    Rule {
        class: Some("Gimp"),
        instance: None,
        title: None,
        tags: 0,
        is_floating: true,
        monitor: -1,
    },
    Rule {
        class: Some("Firefox"),
        instance: None,
        title: None,
        tags: 1 << 8,
        is_floating: false,
        monitor: -1,
    },
];

impl Rule {
    pub fn matches(&self, class: &str, instance: &str, title: &str) -> bool {
        self.title.map_or(true, |t| title.contains(t))
            && self.class.map_or(true, |c| class.contains(c))
            && self.instance.map_or(true, |i| instance.contains(i))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleMatch {
    pub tags: u32,
    pub is_floating: bool,
    pub monitor: i32,
}

/// Fold every matching rule over a window's class/instance/title. A zero tag
/// result means no rule tagged it; the caller falls back to the current view.
pub fn resolve_rules(class: &str, instance: &str, title: &str) -> RuleMatch {
    let mut m = RuleMatch {
        tags: 0,
        is_floating: false,
        monitor: -1,
    };
    for r in &RULES {
        if r.matches(class, instance, title) {
            m.is_floating = r.is_floating;
            m.tags |= r.tags;
            if r.monitor >= 0 {
                m.monitor = r.monitor;
            }
        }
    }
    m.tags &= TAG_MASK;
    m
}

pub struct KeyBinding {
    pub mask: u32,
    pub keysym: u32,
    pub action: Action,
}

pub fn keys() -> Vec<KeyBinding> {
    let mut keys = vec![
        KeyBinding {
            mask: MODKEY,
            keysym: keysym::XK_d,
            action: Action::Spawn(Command::Launcher),
        },
        KeyBinding {
            mask: MODKEY | xlib::ShiftMask,
            keysym: keysym::XK_Return,
            action: Action::Spawn(Command::Terminal),
        },
        KeyBinding {
            mask: MODKEY | xlib::ShiftMask,
            keysym: keysym::XK_b,
            action: Action::ToggleBar,
        },
        KeyBinding {
            mask: MODKEY,
            keysym: keysym::XK_j,
            action: Action::FocusStack(1),
        },
        KeyBinding {
            mask: MODKEY,
            keysym: keysym::XK_k,
            action: Action::FocusStack(-1),
        },
        /* the grow key sends the negative delta: setmfact adds it */
        KeyBinding {
            mask: MODKEY,
            keysym: keysym::XK_plus,
            action: Action::SetMFact(-0.05),
        },
        KeyBinding {
            mask: MODKEY,
            keysym: keysym::XK_minus,
            action: Action::SetMFact(0.05),
        },
        KeyBinding {
            mask: MODKEY,
            keysym: keysym::XK_Return,
            action: Action::Zoom,
        },
        KeyBinding {
            mask: MODKEY,
            keysym: keysym::XK_Tab,
            action: Action::View(0),
        },
        KeyBinding {
            mask: MODKEY,
            keysym: keysym::XK_Delete,
            action: Action::KillClient,
        },
        KeyBinding {
            mask: MODKEY,
            keysym: keysym::XK_t,
            action: Action::SetLayout(Some(&LAYOUTS[0])),
        },
        KeyBinding {
            mask: MODKEY,
            keysym: keysym::XK_f,
            action: Action::SetLayout(Some(&LAYOUTS[1])),
        },
        KeyBinding {
            mask: MODKEY,
            keysym: keysym::XK_o,
            action: Action::SetLayout(Some(&LAYOUTS[2])),
        },
        KeyBinding {
            mask: MODKEY,
            keysym: keysym::XK_b,
            action: Action::SetLayout(Some(&LAYOUTS[3])),
        },
        KeyBinding {
            mask: MODKEY,
            keysym: keysym::XK_h,
            action: Action::SetLayout(Some(&LAYOUTS[4])),
        },
        KeyBinding {
            mask: MODKEY,
            keysym: keysym::XK_space,
            action: Action::SetLayout(None),
        },
        KeyBinding {
            mask: MODKEY | xlib::ShiftMask,
            keysym: keysym::XK_space,
            action: Action::ToggleFloating,
        },
        KeyBinding {
            mask: MODKEY,
            keysym: keysym::XK_0,
            action: Action::View(!0),
        },
        KeyBinding {
            mask: MODKEY | xlib::ShiftMask,
            keysym: keysym::XK_0,
            action: Action::Tag(!0),
        },
        KeyBinding {
            mask: MODKEY,
            keysym: keysym::XK_comma,
            action: Action::FocusMon(0),
        },
        KeyBinding {
            mask: MODKEY,
            keysym: keysym::XK_slash,
            action: Action::FocusMon(1),
        },
        KeyBinding {
            mask: MODKEY,
            keysym: keysym::XK_period,
            action: Action::FocusMon(2),
        },
        KeyBinding {
            mask: MODKEY,
            keysym: keysym::XK_m,
            action: Action::FocusMon(3),
        },
        KeyBinding {
            mask: MODKEY | xlib::ShiftMask,
            keysym: keysym::XK_comma,
            action: Action::TagMon(0),
        },
        KeyBinding {
            mask: MODKEY | xlib::ShiftMask,
            keysym: keysym::XK_slash,
            action: Action::TagMon(1),
        },
        KeyBinding {
            mask: MODKEY | xlib::ShiftMask,
            keysym: keysym::XK_period,
            action: Action::TagMon(2),
        },
        KeyBinding {
            mask: MODKEY | xlib::ShiftMask,
            keysym: keysym::XK_m,
            action: Action::TagMon(3),
        },
        KeyBinding {
            mask: MODKEY | xlib::ShiftMask,
            keysym: keysym::XK_q,
            action: Action::Quit,
        },
    ];

    const TAG_KEYS: [u32; 9] = [
        keysym::XK_1,
        keysym::XK_2,
        keysym::XK_3,
        keysym::XK_4,
        keysym::XK_5,
        keysym::XK_6,
        keysym::XK_7,
        keysym::XK_8,
        keysym::XK_9,
    ];
    for (tag, &key) in TAG_KEYS.iter().enumerate() {
        keys.push(KeyBinding {
            mask: MODKEY,
            keysym: key,
            action: Action::View(1 << tag),
        });
        keys.push(KeyBinding {
            mask: MODKEY | xlib::ControlMask,
            keysym: key,
            action: Action::ToggleView(1 << tag),
        });
        keys.push(KeyBinding {
            mask: MODKEY | xlib::ShiftMask,
            keysym: key,
            action: Action::Tag(1 << tag),
        });
        keys.push(KeyBinding {
            mask: MODKEY | xlib::ControlMask | xlib::ShiftMask,
            keysym: key,
            action: Action::ToggleTag(1 << tag),
        });
    }

    keys
}

/// Where on the screen a button press landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Click {
    TagBar,
    LtSymbol,
    StatusText,
    WinTitle,
    ClientWin,
    RootWin,
}

pub struct ButtonBinding {
    pub click: Click,
    pub mask: u32,
    pub button: u32,
    pub action: Action,
}

/* a zero tag mask on a TagBar binding stands for the clicked tag */
pub fn buttons() -> Vec<ButtonBinding> {
    vec![
        ButtonBinding {
            click: Click::LtSymbol,
            mask: 0,
            button: xlib::Button1,
            action: Action::SetLayout(None),
        },
        ButtonBinding {
            click: Click::LtSymbol,
            mask: 0,
            button: xlib::Button3,
            action: Action::SetLayout(Some(&LAYOUTS[2])),
        },
        ButtonBinding {
            click: Click::WinTitle,
            mask: 0,
            button: xlib::Button2,
            action: Action::Zoom,
        },
        ButtonBinding {
            click: Click::StatusText,
            mask: 0,
            button: xlib::Button2,
            action: Action::Spawn(Command::Terminal),
        },
        ButtonBinding {
            click: Click::ClientWin,
            mask: MODKEY,
            button: xlib::Button1,
            action: Action::MoveMouse,
        },
        ButtonBinding {
            click: Click::ClientWin,
            mask: MODKEY,
            button: xlib::Button2,
            action: Action::ToggleFloating,
        },
        ButtonBinding {
            click: Click::ClientWin,
            mask: MODKEY,
            button: xlib::Button3,
            action: Action::ResizeMouse,
        },
        ButtonBinding {
            click: Click::TagBar,
            mask: 0,
            button: xlib::Button1,
            action: Action::View(0),
        },
        ButtonBinding {
            click: Click::TagBar,
            mask: 0,
            button: xlib::Button3,
            action: Action::ToggleView(0),
        },
        ButtonBinding {
            click: Click::TagBar,
            mask: MODKEY,
            button: xlib::Button1,
            action: Action::Tag(0),
        },
        ButtonBinding {
            click: Click::TagBar,
            mask: MODKEY,
            button: xlib::Button3,
            action: Action::ToggleTag(0),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn firefox_rule_sends_it_to_the_last_tag() {
        let m = resolve_rules("Firefox", "Navigator", "Mozilla Firefox");
        assert_eq!(m.tags, 1 << 8);
        assert!(!m.is_floating);
    }

    #[test]
    fn gimp_rule_floats_without_retagging() {
        let m = resolve_rules("Gimp", "gimp", "GNU Image Manipulation Program");
        assert_eq!(m.tags, 0);
        assert!(m.is_floating);
    }

    #[test]
    fn unmatched_windows_keep_default_placement() {
        let m = resolve_rules("XTerm", "xterm", "bash");
        assert_eq!(
            m,
            RuleMatch {
                tags: 0,
                is_floating: false,
                monitor: -1
            }
        );
    }

    #[test]
    fn rule_matching_is_substring_based() {
        let r = Rule {
            class: None,
            instance: None,
            title: Some("Save"),
            tags: 1,
            is_floating: true,
            monitor: -1,
        };
        assert!(r.matches("Gimp", "gimp", "Save as PNG"));
        assert!(!r.matches("Gimp", "gimp", "Export"));
    }

    #[test]
    fn key_table_has_no_conflicting_bindings() {
        let keys = keys();
        for (i, a) in keys.iter().enumerate() {
            for b in keys.iter().skip(i + 1) {
                assert!(
                    !(a.mask == b.mask && a.keysym == b.keysym),
                    "duplicate binding: mask {:#x} keysym {:#x}",
                    a.mask,
                    a.keysym
                );
            }
        }
    }

    #[test]
    fn every_tag_fits_the_mask() {
        for tag in 0..TAGS.len() {
            assert_ne!((1 << tag) & TAG_MASK, 0);
        }
        assert_eq!(TAG_MASK >> TAGS.len(), 0);
    }
}
