//! Native presentation targets for secondary windows.
//!
//! The host describes its main window once at init (`PlatformDescriptor`). When the
//! UI library opens another OS window it only hands over a raw native handle; the
//! descriptor supplies the platform kind and the display/instance data the handle
//! alone does not carry.

use core::ffi::{c_ulong, c_void};
use core::num::{NonZeroIsize, NonZeroU32};
use core::ptr::NonNull;

use raw_window_handle::{
    RawDisplayHandle, RawWindowHandle, WaylandWindowHandle, Win32WindowHandle, XcbWindowHandle,
    XlibWindowHandle,
};

use crate::error::{BackendError, Result};

/// Raw OS handle of a window as reported by the UI platform layer.
///
/// HWND on Win32, the X window id on Xlib/Xcb, `wl_surface*` on Wayland.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct NativeHandle(pub usize);

impl NativeHandle {
    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// Platform description of the host's main window.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PlatformDescriptor {
    pub window: RawWindowHandle,
    pub display: RawDisplayHandle,
}

impl PlatformDescriptor {
    pub const fn new(window: RawWindowHandle, display: RawDisplayHandle) -> Self {
        Self { window, display }
    }

    /// Short platform name for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self.window {
            RawWindowHandle::Win32(_) => "win32",
            RawWindowHandle::Xlib(_) => "xlib",
            RawWindowHandle::Xcb(_) => "xcb",
            RawWindowHandle::Wayland(_) => "wayland",
            _ => "unsupported",
        }
    }

    /// Builds the presentation target of another window on the same platform.
    pub fn target_for(&self, handle: NativeHandle) -> Result<PresentationTarget> {
        if handle.is_null() {
            return Err(BackendError::InvalidNativeHandle(handle.0));
        }

        let window = match self.window {
            RawWindowHandle::Win32(main) => {
                let hwnd = NonZeroIsize::new(handle.0 as isize)
                    .ok_or(BackendError::InvalidNativeHandle(handle.0))?;
                let mut win = Win32WindowHandle::new(hwnd);
                win.hinstance = main.hinstance;
                RawWindowHandle::Win32(win)
            }
            RawWindowHandle::Xlib(_) => RawWindowHandle::Xlib(XlibWindowHandle::new(handle.0 as c_ulong)),
            RawWindowHandle::Xcb(_) => {
                let id = u32::try_from(handle.0)
                    .ok()
                    .and_then(NonZeroU32::new)
                    .ok_or(BackendError::InvalidNativeHandle(handle.0))?;
                RawWindowHandle::Xcb(XcbWindowHandle::new(id))
            }
            RawWindowHandle::Wayland(_) => {
                let surface = NonNull::new(handle.0 as *mut c_void)
                    .ok_or(BackendError::InvalidNativeHandle(handle.0))?;
                RawWindowHandle::Wayland(WaylandWindowHandle::new(surface))
            }
            _ => return Err(BackendError::UnsupportedPlatform(self.kind())),
        };

        Ok(PresentationTarget {
            window,
            display: self.display,
        })
    }
}

/// Everything a swapchain needs to create its surface.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PresentationTarget {
    pub window: RawWindowHandle,
    pub display: RawDisplayHandle,
}
