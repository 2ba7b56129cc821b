use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int, c_long, c_uchar, c_uint, c_ulong};
use std::ptr::{null, null_mut};

use x11::xft::XftDraw;
use x11::{keysym, xft, xinerama, xlib};

use crate::colour::{Colour, ALL_COLOURS};
use crate::error::DwmError;
use crate::ivec2::IVec2;

pub fn die(s: &str) -> ! {
    eprintln!("dwm: {}", s);
    std::process::exit(1);
}

// From <X11/Xproto.h>
pub const X_SET_INPUT_FOCUS: u8 = 42;
pub const X_POLY_TEXT8: u8 = 74;
pub const X_POLY_FILL_RECTANGLE: u8 = 69;
pub const X_POLY_SEGMENT: u8 = 66;
pub const X_CONFIGURE_WINDOW: u8 = 12;
pub const X_GRAB_BUTTON: u8 = 28;
pub const X_GRAB_KEY: u8 = 33;
pub const X_COPY_AREA: u8 = 62;

pub const BUTTON_MASK: i64 = xlib::ButtonPressMask | xlib::ButtonReleaseMask;
pub const MOUSE_MASK: i64 = BUTTON_MASK | xlib::PointerMotionMask;

// ICCCM WM_STATE values, from <X11/Xutil.h>
pub const WITHDRAWN_STATE: i64 = 0;
pub const NORMAL_STATE: i64 = 1;
pub const ICONIC_STATE: i64 = 3;

static mut X_ERROR_OCCURRED: bool = false;
static mut X_ERROR_DEFAULT: Option<
    unsafe extern "C" fn(*mut xlib::Display, *mut xlib::XErrorEvent) -> c_int,
> = None;

unsafe extern "C" fn x_error_ignore(
    _dpy: *mut xlib::Display,
    _ee: *mut xlib::XErrorEvent,
) -> c_int {
    0
}

unsafe extern "C" fn x_error_start(
    _dpy: *mut xlib::Display,
    _ee: *mut xlib::XErrorEvent,
) -> c_int {
    unsafe {
        X_ERROR_OCCURRED = true;
        0
    }
}

/// There's no way to check accesses to destroyed windows, thus those cases
/// are ignored (especially on UnmapNotify's). Other types of errors are
/// reported and handed to Xlib's default handler, which may call exit.
unsafe extern "C" fn x_error(dpy: *mut xlib::Display, ee: *mut xlib::XErrorEvent) -> c_int {
    let e = unsafe { &*ee };
    if e.error_code == xlib::BadWindow
        || (e.request_code == X_SET_INPUT_FOCUS && e.error_code == xlib::BadMatch)
        || (e.request_code == X_POLY_TEXT8 && e.error_code == xlib::BadDrawable)
        || (e.request_code == X_POLY_FILL_RECTANGLE && e.error_code == xlib::BadDrawable)
        || (e.request_code == X_POLY_SEGMENT && e.error_code == xlib::BadDrawable)
        || (e.request_code == X_CONFIGURE_WINDOW && e.error_code == xlib::BadMatch)
        || (e.request_code == X_GRAB_BUTTON && e.error_code == xlib::BadAccess)
        || (e.request_code == X_GRAB_KEY && e.error_code == xlib::BadAccess)
        || (e.request_code == X_COPY_AREA && e.error_code == xlib::BadDrawable)
    {
        return 0;
    }

    eprintln!(
        "dwm: fatal error: request code={}, error code={}",
        e.request_code, e.error_code
    );
    unsafe {
        match X_ERROR_DEFAULT {
            Some(handler) => handler(dpy, ee),
            None => 0,
        }
    }
}

#[derive(PartialEq, Copy, Clone)]
pub enum Net {
    Supported,
    WMName,
    WMState,
    WMCheck,
    WMFullscreen,
    ActiveWindow,
    WMWindowType,
    WMWindowTypeDialog,
    WMWindowTypeNotification,
    ClientList,
    Last,
}

#[derive(PartialEq, Copy, Clone)]
pub enum WM {
    Protocols,
    Delete,
    State,
    TakeFocus,
    Last,
}

pub enum Atom {
    Net(Net),
    Wm(WM),
}

pub struct Font {
    pub dpy: *mut xlib::Display,
    pub h: c_uint,
    pub xfont: *mut xft::XftFont,
}

impl Drop for Font {
    fn drop(&mut self) {
        unsafe {
            if !self.xfont.is_null() {
                xft::XftFontClose(self.dpy, self.xfont);
            }
        }
    }
}

type Color = xft::XftColor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window(pub xlib::Window);

impl Default for Window {
    fn default() -> Self {
        Window(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorId(pub c_ulong);

pub struct KeySpecification {
    pub mask: u32,
    pub keysym: u32,
}

/// Urgency and input-model bits of WM_HINTS.
pub struct WmHints {
    pub urgent: bool,
    pub input: Option<bool>,
}

/// The X events the manager reacts to, decoded out of the XEvent union once
/// so handlers stay safe code.
pub enum Event {
    ButtonPress(xlib::XButtonEvent),
    ButtonRelease(xlib::XButtonEvent),
    ClientMessage(xlib::XClientMessageEvent),
    ConfigureRequest(xlib::XConfigureRequestEvent),
    ConfigureNotify(xlib::XConfigureEvent),
    DestroyNotify(xlib::XDestroyWindowEvent),
    EnterNotify(xlib::XCrossingEvent),
    Expose(xlib::XExposeEvent),
    FocusIn(xlib::XFocusChangeEvent),
    KeyPress(xlib::XKeyEvent),
    MappingNotify(xlib::XMappingEvent),
    MapRequest(xlib::XMapRequestEvent),
    MotionNotify(xlib::XMotionEvent),
    PropertyNotify(xlib::XPropertyEvent),
    UnmapNotify(xlib::XUnmapEvent),
}

impl Event {
    pub fn decode(ev: xlib::XEvent) -> Option<Event> {
        unsafe {
            match ev.get_type() {
                xlib::ButtonPress => Some(Event::ButtonPress(ev.button)),
                xlib::ButtonRelease => Some(Event::ButtonRelease(ev.button)),
                xlib::ClientMessage => Some(Event::ClientMessage(ev.client_message)),
                xlib::ConfigureRequest => Some(Event::ConfigureRequest(ev.configure_request)),
                xlib::ConfigureNotify => Some(Event::ConfigureNotify(ev.configure)),
                xlib::DestroyNotify => Some(Event::DestroyNotify(ev.destroy_window)),
                xlib::EnterNotify => Some(Event::EnterNotify(ev.crossing)),
                xlib::Expose => Some(Event::Expose(ev.expose)),
                xlib::FocusIn => Some(Event::FocusIn(ev.focus_change)),
                xlib::KeyPress => Some(Event::KeyPress(ev.key)),
                xlib::MappingNotify => Some(Event::MappingNotify(ev.mapping)),
                xlib::MapRequest => Some(Event::MapRequest(ev.map_request)),
                xlib::MotionNotify => Some(Event::MotionNotify(ev.motion)),
                xlib::PropertyNotify => Some(Event::PropertyNotify(ev.property)),
                xlib::UnmapNotify => Some(Event::UnmapNotify(ev.unmap)),
                _ => None,
            }
        }
    }
}

pub struct XWrapper {
    dpy: *mut xlib::Display,
    pub screen: c_int,
    root: xlib::Window,
    drawable: xlib::Drawable,
    gc: xlib::GC,
    xftdraw: *mut XftDraw,
    pub fonts: Vec<Font>,
    colors: [Color; ALL_COLOURS.len()],
    pub atoms: Atoms,
}

impl XWrapper {
    pub fn connect() -> Result<Self, DwmError> {
        unsafe {
            let dpy = xlib::XOpenDisplay(null());
            if dpy.is_null() {
                return Err(DwmError::DisplayOpen);
            }

            let screen = xlib::XDefaultScreen(dpy);
            let root = xlib::XRootWindow(dpy, screen);
            let w = xlib::XDisplayWidth(dpy, screen) as u32;
            let h = xlib::XDisplayHeight(dpy, screen) as u32;

            // one screen-sized pixmap backs all bar drawing
            let drawable =
                xlib::XCreatePixmap(dpy, root, w, h, xlib::XDefaultDepth(dpy, screen) as u32);
            let gc = xlib::XCreateGC(dpy, root, 0, null_mut());
            xlib::XSetLineAttributes(dpy, gc, 1, xlib::LineSolid, xlib::CapButt, xlib::JoinMiter);

            let xftdraw = xft::XftDrawCreate(
                dpy,
                drawable,
                xlib::XDefaultVisual(dpy, screen),
                xlib::XDefaultColormap(dpy, screen),
            );
            if xftdraw.is_null() {
                die("cannot create XftDraw");
            }

            let atoms = Atoms::new(dpy);
            let mut wrapper = Self {
                dpy,
                screen,
                root,
                drawable,
                gc,
                xftdraw,
                fonts: Vec::new(),
                colors: [std::mem::zeroed(); ALL_COLOURS.len()],
                atoms,
            };
            wrapper.init_colors();
            Ok(wrapper)
        }
    }

    fn init_colors(&mut self) {
        for (i, colour) in ALL_COLOURS.iter().enumerate() {
            let rgba = colour.get_colour();
            let mut clr = unsafe { std::mem::zeroed() };
            unsafe {
                if xft::XftColorAllocValue(
                    self.dpy,
                    xlib::XDefaultVisual(self.dpy, self.screen),
                    xlib::XDefaultColormap(self.dpy, self.screen),
                    &x11::xrender::XRenderColor {
                        red: rgba[0] as u16 * 0x101,
                        green: rgba[1] as u16 * 0x101,
                        blue: rgba[2] as u16 * 0x101,
                        alpha: rgba[3] as u16 * 0x101,
                    },
                    &mut clr,
                ) == 0
                {
                    die("cannot allocate color");
                }
            }
            self.colors[i] = clr;
        }
    }

    /// Recreate the drawing pixmap after the screen changed size.
    pub fn resize_drawable(&mut self, w: u32, h: u32) {
        unsafe {
            xft::XftDrawDestroy(self.xftdraw);
            xlib::XFreePixmap(self.dpy, self.drawable);
            self.drawable = xlib::XCreatePixmap(
                self.dpy,
                self.root,
                w,
                h,
                xlib::XDefaultDepth(self.dpy, self.screen) as u32,
            );
            self.xftdraw = xft::XftDrawCreate(
                self.dpy,
                self.drawable,
                xlib::XDefaultVisual(self.dpy, self.screen),
                xlib::XDefaultColormap(self.dpy, self.screen),
            );
        }
    }

    pub fn fontset_create(&mut self, font_names: &[&str]) -> bool {
        for font_name in font_names {
            self.xfont_create(font_name);
        }
        !self.fonts.is_empty()
    }

    fn xfont_create(&mut self, font_name: &str) -> bool {
        unsafe {
            let _fc = fontconfig::Fontconfig::new();

            let cstr = match CString::new(font_name) {
                Ok(s) => s,
                Err(_) => {
                    log::error!("invalid font name '{}': contains NUL", font_name);
                    return false;
                }
            };

            let xfont = xft::XftFontOpenName(self.dpy, self.screen, cstr.as_ptr());
            if xfont.is_null() {
                log::error!("cannot load font from name: '{}'", font_name);
                return false;
            }

            let h = ((*xfont).ascent + (*xfont).descent) as c_uint;
            self.fonts.push(Font {
                dpy: self.dpy,
                h,
                xfont,
            });
            true
        }
    }

    pub fn get_font_height(&self) -> u32 {
        self.fonts.first().map_or(0, |f| f.h)
    }

    pub fn rect(&mut self, color: Colour, tl: IVec2, wh: IVec2, filled: bool) {
        let clr = &self.colors[color as usize];
        unsafe {
            xlib::XSetForeground(self.dpy, self.gc, clr.pixel);
            if filled {
                xlib::XFillRectangle(
                    self.dpy,
                    self.drawable,
                    self.gc,
                    tl.x,
                    tl.y,
                    wh.x as _,
                    wh.y as _,
                );
            } else {
                xlib::XDrawRectangle(
                    self.dpy,
                    self.drawable,
                    self.gc,
                    tl.x,
                    tl.y,
                    (wh.x - 1) as _,
                    (wh.y - 1) as _,
                );
            }
        }
    }

    pub fn text(&mut self, color: Colour, tl: IVec2, wh: IVec2, lpad: u32, text: &str) {
        if self.fonts.is_empty() || text.is_empty() {
            return;
        }
        unsafe {
            let clr = &mut self.colors[color as usize];
            let usedfont = &self.fonts[0];

            let x = tl.x + lpad as i32;
            let font_height = (*usedfont.xfont).ascent + (*usedfont.xfont).descent;
            let y = tl.y + (wh.y - font_height) / 2 + (*usedfont.xfont).ascent;

            xft::XftDrawStringUtf8(
                self.xftdraw,
                clr,
                usedfont.xfont,
                x,
                y,
                text.as_ptr(),
                text.len() as i32,
            );
        }
    }

    pub fn text_width(&self, text: &str) -> u32 {
        if self.fonts.is_empty() {
            return 0;
        }
        unsafe {
            let mut ext = std::mem::zeroed();
            let font = &self.fonts[0];
            xft::XftTextExtentsUtf8(
                self.dpy,
                font.xfont,
                text.as_ptr(),
                text.len() as i32,
                &mut ext,
            );
            ext.xOff as u32
        }
    }

    pub fn map_drawable(&mut self, win: Window, x: i32, y: i32, w: u32, h: u32) {
        unsafe {
            xlib::XCopyArea(self.dpy, self.drawable, win.0, self.gc, x, y, w, h, x, y);
            xlib::XSync(self.dpy, 0);
        }
    }

    fn set_error_handler(
        &self,
        handler: Option<unsafe extern "C" fn(*mut xlib::Display, *mut xlib::XErrorEvent) -> c_int>,
    ) {
        unsafe {
            xlib::XSetErrorHandler(handler);
        }
    }

    /// Selecting SubstructureRedirect on the root fails if some other window
    /// manager already has it.
    pub fn check_for_other_wm(&mut self) -> Result<(), DwmError> {
        unsafe {
            X_ERROR_OCCURRED = false;
            X_ERROR_DEFAULT = xlib::XSetErrorHandler(Some(x_error_start));
            xlib::XSelectInput(self.dpy, self.root, xlib::SubstructureRedirectMask);
            self.sync(false);
            if X_ERROR_OCCURRED {
                return Err(DwmError::OtherWm);
            }
        }
        self.set_default_error_handler();
        self.sync(false);
        Ok(())
    }

    pub fn set_default_error_handler(&self) {
        self.set_error_handler(Some(x_error));
    }

    pub fn set_ignore_error_handler(&self) {
        self.set_error_handler(Some(x_error_ignore));
    }

    pub fn default_screen(&self) -> i32 {
        unsafe { xlib::XDefaultScreen(self.dpy) }
    }

    pub fn root_window(&self, screen_num: i32) -> Window {
        unsafe { Window(xlib::XRootWindow(self.dpy, screen_num)) }
    }

    pub fn display_width(&self, screen_num: i32) -> i32 {
        unsafe { xlib::XDisplayWidth(self.dpy, screen_num) }
    }

    pub fn display_height(&self, screen_num: i32) -> i32 {
        unsafe { xlib::XDisplayHeight(self.dpy, screen_num) }
    }

    pub fn connection_number(&self) -> c_int {
        unsafe { xlib::XConnectionNumber(self.dpy) }
    }

    pub fn support_locale(&self) -> bool {
        unsafe {
            let empty = CString::new("").unwrap();
            !libc::setlocale(libc::LC_CTYPE, empty.as_ptr()).is_null()
                && xlib::XSupportsLocale() != 0
        }
    }

    /// Override-redirect bar window listening for clicks and exposure.
    pub fn create_bar_window(&self, x: i32, y: i32, w: u32, h: u32, cursor: CursorId) -> Window {
        unsafe {
            let mut wa: xlib::XSetWindowAttributes = std::mem::zeroed();
            wa.override_redirect = 1;
            wa.background_pixmap = xlib::ParentRelative as xlib::Pixmap;
            wa.event_mask = xlib::ButtonPressMask | xlib::ExposureMask;
            let win = Window(xlib::XCreateWindow(
                self.dpy,
                self.root,
                x,
                y,
                w,
                h,
                0,
                xlib::XDefaultDepth(self.dpy, self.screen),
                xlib::InputOutput as u32,
                xlib::XDefaultVisual(self.dpy, self.screen),
                xlib::CWOverrideRedirect | xlib::CWBackPixmap | xlib::CWEventMask,
                &mut wa,
            ));
            xlib::XDefineCursor(self.dpy, win.0, cursor.0);
            win
        }
    }

    pub fn create_simple_window(&self, parent: Window) -> Window {
        unsafe { Window(xlib::XCreateSimpleWindow(self.dpy, parent.0, 0, 0, 1, 1, 0, 0, 0)) }
    }

    /// Root-window event selection and cursor, claimed once at startup.
    pub fn set_root_attributes(&self, cursor: CursorId, event_mask: i64) {
        unsafe {
            let mut wa: xlib::XSetWindowAttributes = std::mem::zeroed();
            wa.cursor = cursor.0;
            wa.event_mask = event_mask;
            xlib::XChangeWindowAttributes(
                self.dpy,
                self.root,
                xlib::CWEventMask | xlib::CWCursor,
                &mut wa,
            );
            xlib::XSelectInput(self.dpy, self.root, event_mask);
        }
    }

    pub fn create_cursor(&self, shape: u32) -> CursorId {
        CursorId(unsafe { xlib::XCreateFontCursor(self.dpy, shape) })
    }

    pub fn free_cursor(&self, cursor: CursorId) {
        unsafe {
            xlib::XFreeCursor(self.dpy, cursor.0);
        }
    }

    pub fn map_window(&self, win: Window) {
        unsafe { xlib::XMapWindow(self.dpy, win.0) };
    }

    pub fn map_raised(&self, win: Window) {
        unsafe { xlib::XMapRaised(self.dpy, win.0) };
    }

    pub fn unmap_window(&self, win: Window) {
        unsafe { xlib::XUnmapWindow(self.dpy, win.0) };
    }

    pub fn destroy_window(&self, win: Window) {
        unsafe { xlib::XDestroyWindow(self.dpy, win.0) };
    }

    pub fn raise_window(&self, win: Window) {
        unsafe { xlib::XRaiseWindow(self.dpy, win.0) };
    }

    pub fn move_window(&self, win: Window, x: i32, y: i32) {
        unsafe {
            xlib::XMoveWindow(self.dpy, win.0, x, y);
        }
    }

    pub fn move_resize_window(&self, win: Window, x: i32, y: i32, w: u32, h: u32) {
        unsafe {
            xlib::XMoveResizeWindow(self.dpy, win.0, x, y, w, h);
        }
    }

    pub fn configure_window(&self, win: Window, x: i32, y: i32, w: i32, h: i32, bw: i32) {
        unsafe {
            let mut wc: xlib::XWindowChanges = std::mem::zeroed();
            wc.x = x;
            wc.y = y;
            wc.width = w;
            wc.height = h;
            wc.border_width = bw;
            let mask =
                xlib::CWX | xlib::CWY | xlib::CWWidth | xlib::CWHeight | xlib::CWBorderWidth;
            xlib::XConfigureWindow(self.dpy, win.0, mask as u32, &mut wc);
        }
    }

    pub fn set_border_width(&self, win: Window, bw: i32) {
        unsafe {
            let mut wc: xlib::XWindowChanges = std::mem::zeroed();
            wc.border_width = bw;
            xlib::XConfigureWindow(self.dpy, win.0, xlib::CWBorderWidth as u32, &mut wc);
        }
    }

    /// Forward a configure request of a window we don't manage, verbatim.
    pub fn configure_forward(&self, ev: &xlib::XConfigureRequestEvent) {
        unsafe {
            let mut wc: xlib::XWindowChanges = std::mem::zeroed();
            wc.x = ev.x;
            wc.y = ev.y;
            wc.width = ev.width;
            wc.height = ev.height;
            wc.border_width = ev.border_width;
            wc.sibling = ev.above;
            wc.stack_mode = ev.detail;
            xlib::XConfigureWindow(self.dpy, ev.window, ev.value_mask as u32, &mut wc);
        }
    }

    /// Restack `windows[1..]` each below its predecessor, `windows[0]` on
    /// top of them all.
    pub fn stack_below(&self, windows: &[Window]) {
        unsafe {
            let mut wc: xlib::XWindowChanges = std::mem::zeroed();
            wc.stack_mode = xlib::Below;
            for pair in windows.windows(2) {
                wc.sibling = pair[0].0;
                xlib::XConfigureWindow(
                    self.dpy,
                    pair[1].0,
                    (xlib::CWSibling | xlib::CWStackMode) as u32,
                    &mut wc,
                );
            }
        }
    }

    pub fn change_property(
        &self,
        win: Window,
        property: xlib::Atom,
        type_: xlib::Atom,
        format: i32,
        mode: i32,
        data: *const u8,
        nelements: i32,
    ) {
        unsafe {
            xlib::XChangeProperty(self.dpy, win.0, property, type_, format, mode, data, nelements);
        }
    }

    pub fn replace_window_prop(&self, win: Window, property: xlib::Atom, value: Window) {
        self.change_property(
            win,
            property,
            xlib::XA_WINDOW,
            32,
            xlib::PropModeReplace,
            &value.0 as *const c_ulong as *const c_uchar,
            1,
        );
    }

    pub fn append_window_prop(&self, win: Window, property: xlib::Atom, value: Window) {
        self.change_property(
            win,
            property,
            xlib::XA_WINDOW,
            32,
            xlib::PropModeAppend,
            &value.0 as *const c_ulong as *const c_uchar,
            1,
        );
    }

    pub fn replace_atom_prop(&self, win: Window, property: xlib::Atom, values: &[xlib::Atom]) {
        self.change_property(
            win,
            property,
            xlib::XA_ATOM,
            32,
            xlib::PropModeReplace,
            values.as_ptr() as *const c_uchar,
            values.len() as i32,
        );
    }

    pub fn replace_string_prop(&self, win: Window, property: xlib::Atom, value: &str) {
        self.change_property(
            win,
            property,
            xlib::XA_STRING,
            8,
            xlib::PropModeReplace,
            value.as_ptr(),
            value.len() as i32,
        );
    }

    pub fn delete_property(&self, win: Window, property: xlib::Atom) {
        unsafe {
            xlib::XDeleteProperty(self.dpy, win.0, property);
        }
    }

    /// ICCCM WM_STATE: NormalState, IconicState or WithdrawnState.
    pub fn set_client_state(&self, win: Window, state: i64) {
        let data: [c_long; 2] = [state as c_long, 0];
        let atom = self.atoms.get(Atom::Wm(WM::State));
        self.change_property(
            win,
            atom,
            atom,
            32,
            xlib::PropModeReplace,
            data.as_ptr() as *const c_uchar,
            2,
        );
    }

    pub fn get_wm_state(&self, win: Window) -> i64 {
        let atom = self.atoms.get(Atom::Wm(WM::State));
        unsafe {
            let mut real: xlib::Atom = 0;
            let mut format: c_int = 0;
            let mut n: c_ulong = 0;
            let mut extra: c_ulong = 0;
            let mut p: *mut c_uchar = null_mut();
            if xlib::XGetWindowProperty(
                self.dpy, win.0, atom, 0, 2, 0, atom, &mut real, &mut format, &mut n, &mut extra,
                &mut p,
            ) != xlib::Success as i32
            {
                return -1;
            }
            let mut result = -1;
            if n != 0 && !p.is_null() {
                result = *(p as *const c_long) as i64;
            }
            if !p.is_null() {
                xlib::XFree(p as *mut _);
            }
            result
        }
    }

    /// First atom of a 32-bit atom property, e.g. _NET_WM_WINDOW_TYPE.
    pub fn get_atom_prop(&self, win: Window, prop: xlib::Atom) -> Option<xlib::Atom> {
        unsafe {
            let mut real: xlib::Atom = 0;
            let mut format: c_int = 0;
            let mut n: c_ulong = 0;
            let mut extra: c_ulong = 0;
            let mut p: *mut c_uchar = null_mut();
            let mut atom = None;
            if xlib::XGetWindowProperty(
                self.dpy,
                win.0,
                prop,
                0,
                std::mem::size_of::<xlib::Atom>() as c_long,
                0,
                xlib::XA_ATOM,
                &mut real,
                &mut format,
                &mut n,
                &mut extra,
                &mut p,
            ) == xlib::Success as i32
                && !p.is_null()
            {
                if n > 0 {
                    atom = Some(*(p as *const xlib::Atom));
                }
                xlib::XFree(p as *mut _);
            }
            atom
        }
    }

    /// All atoms of a 32-bit atom property.
    pub fn get_atom_props(&self, win: Window, prop: xlib::Atom) -> Vec<xlib::Atom> {
        unsafe {
            let mut real: xlib::Atom = 0;
            let mut format: c_int = 0;
            let mut n: c_ulong = 0;
            let mut extra: c_ulong = 0;
            let mut p: *mut c_uchar = null_mut();
            let mut atoms = Vec::new();
            if xlib::XGetWindowProperty(
                self.dpy,
                win.0,
                prop,
                0,
                c_long::MAX,
                0,
                xlib::XA_ATOM,
                &mut real,
                &mut format,
                &mut n,
                &mut extra,
                &mut p,
            ) == xlib::Success as i32
                && !p.is_null()
            {
                atoms.extend_from_slice(std::slice::from_raw_parts(
                    p as *const xlib::Atom,
                    n as usize,
                ));
                xlib::XFree(p as *mut _);
            }
            atoms
        }
    }

    /// Text property decoded to UTF-8, trying the modern list conversion
    /// first and falling back to a raw latin-1 read.
    pub fn get_text_prop(&self, win: Window, atom: xlib::Atom) -> Option<String> {
        unsafe {
            let mut prop: xlib::XTextProperty = std::mem::zeroed();
            if xlib::XGetTextProperty(self.dpy, win.0, &mut prop, atom) == 0
                || prop.value.is_null()
                || prop.nitems == 0
            {
                return None;
            }

            let result = if prop.encoding == xlib::XA_STRING {
                Some(
                    CStr::from_ptr(prop.value as *const c_char)
                        .to_string_lossy()
                        .into_owned(),
                )
            } else {
                let mut list: *mut *mut c_char = null_mut();
                let mut count = 0;
                if xlib::Xutf8TextPropertyToTextList(self.dpy, &prop, &mut list, &mut count)
                    >= xlib::Success as i32
                    && count > 0
                    && !list.is_null()
                    && !(*list).is_null()
                {
                    let s = CStr::from_ptr(*list).to_string_lossy().into_owned();
                    xlib::XFreeStringList(list);
                    Some(s)
                } else {
                    None
                }
            };
            xlib::XFree(prop.value as *mut _);
            result
        }
    }

    pub fn get_window_title(&self, win: Window) -> Option<String> {
        self.get_text_prop(win, self.atoms.get(Atom::Net(Net::WMName)))
            .or_else(|| self.get_text_prop(win, xlib::XA_WM_NAME))
    }

    pub fn get_class_hint(&self, win: Window) -> Option<(String, String)> {
        unsafe {
            let mut ch: xlib::XClassHint = std::mem::zeroed();
            if xlib::XGetClassHint(self.dpy, win.0, &mut ch) == 0 {
                return None;
            }
            let instance = if ch.res_name.is_null() {
                String::new()
            } else {
                CStr::from_ptr(ch.res_name).to_string_lossy().into_owned()
            };
            let class = if ch.res_class.is_null() {
                String::new()
            } else {
                CStr::from_ptr(ch.res_class).to_string_lossy().into_owned()
            };
            if !ch.res_name.is_null() {
                xlib::XFree(ch.res_name as *mut _);
            }
            if !ch.res_class.is_null() {
                xlib::XFree(ch.res_class as *mut _);
            }
            Some((instance, class))
        }
    }

    pub fn get_window_attributes(&self, win: Window) -> Option<xlib::XWindowAttributes> {
        unsafe {
            let mut wa: xlib::XWindowAttributes = std::mem::zeroed();
            if xlib::XGetWindowAttributes(self.dpy, win.0, &mut wa) != 0 {
                Some(wa)
            } else {
                None
            }
        }
    }

    pub fn get_transient_for_hint(&self, win: Window) -> Option<Window> {
        unsafe {
            let mut trans: xlib::Window = 0;
            if xlib::XGetTransientForHint(self.dpy, win.0, &mut trans) != 0 && trans != 0 {
                Some(Window(trans))
            } else {
                None
            }
        }
    }

    pub fn get_wm_normal_hints(&self, win: Window) -> Option<xlib::XSizeHints> {
        unsafe {
            let mut hints: xlib::XSizeHints = std::mem::zeroed();
            let mut supplied: c_long = 0;
            if xlib::XGetWMNormalHints(self.dpy, win.0, &mut hints, &mut supplied) == 0 {
                None
            } else {
                Some(hints)
            }
        }
    }

    pub fn wm_hints(&self, win: Window) -> Option<WmHints> {
        unsafe {
            let wmh = xlib::XGetWMHints(self.dpy, win.0);
            if wmh.is_null() {
                return None;
            }
            let hints = WmHints {
                urgent: (*wmh).flags & xlib::XUrgencyHint != 0,
                input: ((*wmh).flags & xlib::InputHint != 0).then(|| (*wmh).input != 0),
            };
            xlib::XFree(wmh as *mut _);
            Some(hints)
        }
    }

    /// Remove the urgency bit from WM_HINTS.
    pub fn clear_urgency(&self, win: Window) {
        unsafe {
            let wmh = xlib::XGetWMHints(self.dpy, win.0);
            if wmh.is_null() {
                return;
            }
            (*wmh).flags &= !xlib::XUrgencyHint;
            xlib::XSetWMHints(self.dpy, win.0, wmh);
            xlib::XFree(wmh as *mut _);
        }
    }

    pub fn query_tree(&self, win: Window) -> Option<Vec<Window>> {
        unsafe {
            let mut root_return: xlib::Window = 0;
            let mut parent_return: xlib::Window = 0;
            let mut children: *mut xlib::Window = null_mut();
            let mut nchildren: u32 = 0;
            if xlib::XQueryTree(
                self.dpy,
                win.0,
                &mut root_return,
                &mut parent_return,
                &mut children,
                &mut nchildren,
            ) == 0
            {
                return None;
            }
            let wins = if nchildren > 0 {
                std::slice::from_raw_parts(children, nchildren as usize)
                    .iter()
                    .map(|&w| Window(w))
                    .collect()
            } else {
                Vec::new()
            };
            if !children.is_null() {
                xlib::XFree(children as *mut _);
            }
            Some(wins)
        }
    }

    pub fn select_input(&self, win: Window, mask: i64) {
        unsafe {
            xlib::XSelectInput(self.dpy, win.0, mask);
        }
    }

    pub fn set_input_focus(&self, win: Window) {
        unsafe {
            xlib::XSetInputFocus(self.dpy, win.0, xlib::RevertToPointerRoot, xlib::CurrentTime);
        }
    }

    pub fn restore_input_focus(&self) {
        unsafe {
            xlib::XSetInputFocus(
                self.dpy,
                xlib::PointerRoot as xlib::Window,
                xlib::RevertToPointerRoot,
                xlib::CurrentTime,
            );
        }
    }

    pub fn grab_keys(&self, win: Window, numlockmask: u32, keys: &[KeySpecification]) {
        unsafe {
            xlib::XUngrabKey(self.dpy, xlib::AnyKey, xlib::AnyModifier, win.0);

            let modifiers = [0, xlib::LockMask, numlockmask, numlockmask | xlib::LockMask];
            for key in keys {
                let code = xlib::XKeysymToKeycode(self.dpy, key.keysym as u64);
                if code == 0 {
                    continue;
                }
                for &m in &modifiers {
                    xlib::XGrabKey(
                        self.dpy,
                        code as c_int,
                        key.mask | m,
                        win.0,
                        1,
                        xlib::GrabModeAsync,
                        xlib::GrabModeAsync,
                    );
                }
            }
        }
    }

    pub fn ungrab_keys(&self, win: Window) {
        unsafe {
            xlib::XUngrabKey(self.dpy, xlib::AnyKey, xlib::AnyModifier, win.0);
        }
    }

    /// Focused clients get the configured button bindings, unfocused ones a
    /// catch-all grab so the first click reaches the manager.
    pub fn grab_buttons(
        &self,
        win: Window,
        numlockmask: u32,
        focused: bool,
        bindings: &[(u32, u32)],
    ) {
        unsafe {
            xlib::XUngrabButton(self.dpy, xlib::AnyButton as u32, xlib::AnyModifier, win.0);
            let modifiers = [0, xlib::LockMask, numlockmask, numlockmask | xlib::LockMask];
            if focused {
                for &(button, mask) in bindings {
                    for &m in &modifiers {
                        xlib::XGrabButton(
                            self.dpy,
                            button,
                            mask | m,
                            win.0,
                            0,
                            BUTTON_MASK as c_uint,
                            xlib::GrabModeAsync,
                            xlib::GrabModeSync,
                            0,
                            0,
                        );
                    }
                }
            } else {
                xlib::XGrabButton(
                    self.dpy,
                    xlib::AnyButton as u32,
                    xlib::AnyModifier,
                    win.0,
                    0,
                    BUTTON_MASK as c_uint,
                    xlib::GrabModeAsync,
                    xlib::GrabModeSync,
                    0,
                    0,
                );
            }
        }
    }

    pub fn ungrab_buttons(&self, win: Window) {
        unsafe {
            xlib::XUngrabButton(self.dpy, xlib::AnyButton as u32, xlib::AnyModifier, win.0);
        }
    }

    pub fn grab_pointer(&self, cursor: CursorId) -> bool {
        unsafe {
            xlib::XGrabPointer(
                self.dpy,
                self.root,
                0,
                MOUSE_MASK as c_uint,
                xlib::GrabModeAsync,
                xlib::GrabModeAsync,
                0,
                cursor.0,
                xlib::CurrentTime,
            ) == xlib::GrabSuccess
        }
    }

    pub fn ungrab_pointer(&self) {
        unsafe {
            xlib::XUngrabPointer(self.dpy, xlib::CurrentTime);
        }
    }

    pub fn warp_pointer(&self, dest: Window, x: i32, y: i32) {
        unsafe {
            xlib::XWarpPointer(self.dpy, 0, dest.0, 0, 0, 0, 0, x, y);
        }
    }

    pub fn keycode_to_keysym(&self, keycode: u32) -> u64 {
        unsafe { xlib::XKeycodeToKeysym(self.dpy, keycode as u8, 0) }
    }

    pub fn refresh_keyboard_mapping(&self, ev: &mut xlib::XMappingEvent) {
        unsafe {
            xlib::XRefreshKeyboardMapping(ev);
        }
    }

    pub fn get_numlock_mask(&self) -> u32 {
        unsafe {
            let mut numlockmask = 0;
            let modmap = xlib::XGetModifierMapping(self.dpy);
            if modmap.is_null() {
                return 0;
            }

            let max_keypermod = (*modmap).max_keypermod;
            let mut p = (*modmap).modifiermap;
            for i in 0..8 {
                for _ in 0..max_keypermod {
                    if *p != 0 && xlib::XKeycodeToKeysym(self.dpy, *p, 0) as u32 == keysym::XK_Num_Lock
                    {
                        numlockmask = 1 << i;
                    }
                    p = p.offset(1);
                }
            }

            xlib::XFreeModifiermap(modmap);
            numlockmask
        }
    }

    /// Strip lock modifiers so bindings fire regardless of Num/CapsLock.
    pub fn clean_mask(&self, mask: u32, numlockmask: u32) -> u32 {
        mask & !(numlockmask | xlib::LockMask)
            & (xlib::ShiftMask
                | xlib::ControlMask
                | xlib::Mod1Mask
                | xlib::Mod2Mask
                | xlib::Mod3Mask
                | xlib::Mod4Mask
                | xlib::Mod5Mask)
    }

    pub fn query_pointer_position(&self) -> Option<(i32, i32)> {
        unsafe {
            let mut root_return = 0;
            let mut child_return = 0;
            let mut root_x = 0;
            let mut root_y = 0;
            let mut win_x = 0;
            let mut win_y = 0;
            let mut mask = 0;
            if xlib::XQueryPointer(
                self.dpy,
                self.root,
                &mut root_return,
                &mut child_return,
                &mut root_x,
                &mut root_y,
                &mut win_x,
                &mut win_y,
                &mut mask,
            ) != 0
            {
                Some((root_x, root_y))
            } else {
                None
            }
        }
    }

    /// Unique physical screens reported by Xinerama, or None when the
    /// extension is inactive.
    pub fn xinerama_screens(&self) -> Option<Vec<(i32, i32, i32, i32)>> {
        unsafe {
            if xinerama::XineramaIsActive(self.dpy) == 0 {
                return None;
            }
            let mut n: c_int = 0;
            let info = xinerama::XineramaQueryScreens(self.dpy, &mut n);
            if info.is_null() {
                return None;
            }
            let screens = std::slice::from_raw_parts(info, n as usize)
                .iter()
                .map(|s| (s.x_org as i32, s.y_org as i32, s.width as i32, s.height as i32))
                .collect();
            xlib::XFree(info as *mut _);
            Some(screens)
        }
    }

    pub fn get_wm_protocols(&self, win: Window) -> Vec<xlib::Atom> {
        unsafe {
            let mut protocols_ptr: *mut xlib::Atom = null_mut();
            let mut count = 0;
            if xlib::XGetWMProtocols(self.dpy, win.0, &mut protocols_ptr, &mut count) != 0
                && count > 0
                && !protocols_ptr.is_null()
            {
                let protocols =
                    std::slice::from_raw_parts(protocols_ptr, count as usize).to_vec();
                xlib::XFree(protocols_ptr as *mut _);
                protocols
            } else {
                Vec::new()
            }
        }
    }

    pub fn send_client_message(&self, win: Window, message_type: xlib::Atom, data: [i64; 5]) {
        unsafe {
            let mut ev: xlib::XEvent = std::mem::zeroed();
            ev.client_message.type_ = xlib::ClientMessage;
            ev.client_message.window = win.0;
            ev.client_message.message_type = message_type;
            ev.client_message.format = 32;
            for (i, &d) in data.iter().enumerate() {
                ev.client_message.data.set_long(i, d);
            }
            xlib::XSendEvent(self.dpy, win.0, 0, xlib::NoEventMask, &mut ev);
        }
    }

    /// Offer a WM protocol to a client; returns whether the client claims to
    /// support it.
    pub fn send_event(&self, win: Window, proto: xlib::Atom) -> bool {
        if !self.get_wm_protocols(win).contains(&proto) {
            return false;
        }
        let mut data = [0; 5];
        data[0] = proto as i64;
        data[1] = xlib::CurrentTime as i64;
        self.send_client_message(win, self.atoms.get(Atom::Wm(WM::Protocols)), data);
        true
    }

    /// Synthetic ConfigureNotify telling a client its final geometry.
    pub fn send_configure_event(&self, win: Window, x: i32, y: i32, w: i32, h: i32, bw: i32) {
        unsafe {
            let mut ce: xlib::XConfigureEvent = std::mem::zeroed();
            ce.type_ = xlib::ConfigureNotify;
            ce.display = self.dpy;
            ce.event = win.0;
            ce.window = win.0;
            ce.x = x;
            ce.y = y;
            ce.width = w;
            ce.height = h;
            ce.border_width = bw;
            let mut ev = xlib::XEvent { configure: ce };
            xlib::XSendEvent(self.dpy, win.0, 0, xlib::StructureNotifyMask, &mut ev);
        }
    }

    pub fn grab_server(&self) {
        unsafe { xlib::XGrabServer(self.dpy) };
    }

    pub fn ungrab_server(&self) {
        unsafe { xlib::XUngrabServer(self.dpy) };
    }

    pub fn set_close_down_mode(&self, mode: i32) {
        unsafe { xlib::XSetCloseDownMode(self.dpy, mode) };
    }

    pub fn kill_client(&self, win: Window) {
        unsafe { xlib::XKillClient(self.dpy, win.0) };
    }

    pub fn sync(&self, discard: bool) {
        unsafe { xlib::XSync(self.dpy, discard as c_int) };
    }

    /// Blocking wait for the next event of any kind.
    pub fn next_event(&self) -> Option<xlib::XEvent> {
        unsafe {
            let mut ev: xlib::XEvent = std::mem::zeroed();
            if xlib::XNextEvent(self.dpy, &mut ev) == 0 {
                Some(ev)
            } else {
                None
            }
        }
    }

    /// Blocking wait for the next event matching `mask`.
    pub fn mask_event(&self, mask: i64) -> xlib::XEvent {
        unsafe {
            let mut ev: xlib::XEvent = std::mem::zeroed();
            xlib::XMaskEvent(self.dpy, mask, &mut ev);
            ev
        }
    }

    /// Throw away every queued event matching `mask`.
    pub fn drain_events(&self, mask: i64) {
        unsafe {
            let mut ev: xlib::XEvent = std::mem::zeroed();
            while xlib::XCheckMaskEvent(self.dpy, mask, &mut ev) != 0 {}
        }
    }

    pub fn set_window_border_color(&self, win: Window, color: Colour) {
        unsafe {
            xlib::XSetWindowBorder(self.dpy, win.0, self.colors[color as usize].pixel);
        }
    }
}

impl Drop for XWrapper {
    fn drop(&mut self) {
        unsafe {
            if !self.xftdraw.is_null() {
                xft::XftDrawDestroy(self.xftdraw);
            }
            xlib::XFreePixmap(self.dpy, self.drawable);
            xlib::XFreeGC(self.dpy, self.gc);
            xlib::XCloseDisplay(self.dpy);
        }
    }
}

pub struct Atoms {
    wmatom: [xlib::Atom; WM::Last as usize],
    netatom: [xlib::Atom; Net::Last as usize],
}

impl Atoms {
    pub fn new(dpy: *mut xlib::Display) -> Self {
        let mut atoms = Self {
            wmatom: [0; WM::Last as usize],
            netatom: [0; Net::Last as usize],
        };

        let intern = |name: &[u8]| -> xlib::Atom {
            unsafe { xlib::XInternAtom(dpy, name.as_ptr() as *const c_char, 0) }
        };

        atoms.wmatom[WM::Protocols as usize] = intern(b"WM_PROTOCOLS\0");
        atoms.wmatom[WM::Delete as usize] = intern(b"WM_DELETE_WINDOW\0");
        atoms.wmatom[WM::State as usize] = intern(b"WM_STATE\0");
        atoms.wmatom[WM::TakeFocus as usize] = intern(b"WM_TAKE_FOCUS\0");
        atoms.netatom[Net::ActiveWindow as usize] = intern(b"_NET_ACTIVE_WINDOW\0");
        atoms.netatom[Net::Supported as usize] = intern(b"_NET_SUPPORTED\0");
        atoms.netatom[Net::WMName as usize] = intern(b"_NET_WM_NAME\0");
        atoms.netatom[Net::WMState as usize] = intern(b"_NET_WM_STATE\0");
        atoms.netatom[Net::WMCheck as usize] = intern(b"_NET_SUPPORTING_WM_CHECK\0");
        atoms.netatom[Net::WMFullscreen as usize] = intern(b"_NET_WM_STATE_FULLSCREEN\0");
        atoms.netatom[Net::WMWindowType as usize] = intern(b"_NET_WM_WINDOW_TYPE\0");
        atoms.netatom[Net::WMWindowTypeDialog as usize] =
            intern(b"_NET_WM_WINDOW_TYPE_DIALOG\0");
        atoms.netatom[Net::WMWindowTypeNotification as usize] =
            intern(b"_NET_WM_WINDOW_TYPE_NOTIFICATION\0");
        atoms.netatom[Net::ClientList as usize] = intern(b"_NET_CLIENT_LIST\0");

        atoms
    }

    pub fn get(&self, atom: Atom) -> xlib::Atom {
        match atom {
            Atom::Net(net_atom) => self.netatom[net_atom as usize],
            Atom::Wm(wm_atom) => self.wmatom[wm_atom as usize],
        }
    }

    pub fn net_atoms(&self) -> &[xlib::Atom] {
        &self.netatom
    }
}
