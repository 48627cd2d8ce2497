use std::io;
use std::mem;
use std::os::fd::RawFd;
use std::ptr;

use crate::bits::BitBuf;

const IOC_NRBITS: libc::c_ulong = 8;
const IOC_TYPEBITS: libc::c_ulong = 8;
const IOC_SIZEBITS: libc::c_ulong = 14;
const IOC_NRSHIFT: libc::c_ulong = 0;
const IOC_TYPESHIFT: libc::c_ulong = IOC_NRSHIFT + IOC_NRBITS;
const IOC_SIZESHIFT: libc::c_ulong = IOC_TYPESHIFT + IOC_TYPEBITS;
const IOC_DIRSHIFT: libc::c_ulong = IOC_SIZESHIFT + IOC_SIZEBITS;
const IOC_WRITE: libc::c_ulong = 1;
const IOC_READ: libc::c_ulong = 2;

const EVIOCGVERSION: u8 = 0x01;
const EVIOCGID: u8 = 0x02;
const EVIOCGNAME: u8 = 0x06;
const EVIOCGBIT: u8 = 0x20;
const EVIOCGRAB: u8 = 0x90;

/// The `EVIOCG*` request numbers for the per-type state ioctls.
pub(crate) const EVIOCGKEY: u8 = 0x18;
pub(crate) const EVIOCGLED: u8 = 0x19;
pub(crate) const EVIOCGSND: u8 = 0x1a;
pub(crate) const EVIOCGSW: u8 = 0x1b;

const DEVICE_NAME_MAX_LEN: usize = 256;

/// Build an `'E'` ioctl request, like the kernel's `_IOC` macro.
const fn ioc(dir: libc::c_ulong, nr: u8, size: usize) -> libc::c_ulong {
    (dir << IOC_DIRSHIFT)
        | (('E' as libc::c_ulong) << IOC_TYPESHIFT)
        | ((nr as libc::c_ulong) << IOC_NRSHIFT)
        | ((size as libc::c_ulong) << IOC_SIZESHIFT)
}

/// Read the evdev driver version using the `EVIOCGVERSION` ioctl.
pub(crate) fn read_version(fd: RawFd) -> io::Result<libc::c_int> {
    let mut version: libc::c_int = 0;

    ioctl(
        fd,
        ioc(IOC_READ, EVIOCGVERSION, mem::size_of::<libc::c_int>()),
        (&mut version) as *mut libc::c_int as *mut libc::c_void,
    )?;

    Ok(version)
}

/// Read the bus/vendor/product/version identity using the `EVIOCGID` ioctl.
pub(crate) fn read_id(fd: RawFd) -> io::Result<libc::input_id> {
    let mut id = libc::input_id {
        bustype: 0,
        vendor: 0,
        product: 0,
        version: 0,
    };

    ioctl(
        fd,
        ioc(IOC_READ, EVIOCGID, mem::size_of::<libc::input_id>()),
        (&mut id) as *mut libc::input_id as *mut libc::c_void,
    )?;

    Ok(id)
}

/// Read the name of the device using the `EVIOCGNAME` ioctl.
pub(crate) fn read_name(fd: RawFd) -> io::Result<String> {
    let mut device_name = [0u8; DEVICE_NAME_MAX_LEN];

    ioctl(
        fd,
        ioc(IOC_READ, EVIOCGNAME, device_name.len()),
        device_name.as_mut_ptr() as *mut libc::c_void,
    )?;

    let len = device_name
        .iter()
        .position(|&b| b == 0)
        .unwrap_or(device_name.len());

    Ok(String::from_utf8_lossy(&device_name[..len]).into())
}

/// Read the codes of type `ty` supported by the device using the `EVIOCGBIT` ioctl.
///
/// `ty == 0` reads the supported event types.
pub(crate) fn read_bits(fd: RawFd, ty: u8, bits: &mut BitBuf) -> io::Result<()> {
    let nr = EVIOCGBIT
        .checked_add(ty)
        .ok_or_else(|| io::Error::from_raw_os_error(libc::EINVAL))?;

    ioctl(
        fd,
        ioc(IOC_READ, nr, bits.byte_len()),
        bits.as_mut_ptr() as *mut libc::c_void,
    )
}

/// Read the current state bits using one of the `EVIOCGKEY`-family ioctls.
pub(crate) fn read_state(fd: RawFd, nr: u8, bits: &mut BitBuf) -> io::Result<()> {
    ioctl(
        fd,
        ioc(IOC_READ, nr, bits.byte_len()),
        bits.as_mut_ptr() as *mut libc::c_void,
    )
}

/// Grab or release the device using the `EVIOCGRAB` ioctl.
pub(crate) fn grab(fd: RawFd, grab: bool) -> io::Result<()> {
    let arg = if grab { 1usize as *mut libc::c_void } else { ptr::null_mut() };

    ioctl(fd, ioc(IOC_WRITE, EVIOCGRAB, mem::size_of::<libc::c_int>()), arg)
}

/// Block until `fd` is readable. There is no timeout.
pub(crate) fn poll_readable(fd: RawFd) -> io::Result<()> {
    let mut pfd = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };

    let res = unsafe { libc::poll(&mut pfd, 1, -1) };

    if res < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

/// Read up to `buf.len()` bytes of input records from `fd`.
pub(crate) fn read(fd: RawFd, buf: &mut [u8]) -> io::Result<usize> {
    let n = unsafe { libc::read(fd, buf.as_mut_ptr() as *mut libc::c_void, buf.len()) };

    if n < 0 {
        return Err(io::Error::last_os_error());
    }

    Ok(n as usize)
}

fn ioctl(fd: RawFd, request: libc::c_ulong, arg: *mut libc::c_void) -> io::Result<()> {
    let res = unsafe { libc::ioctl(fd, request, arg) };

    if res < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_encoding_matches_the_kernel() {
        // Values from <linux/input.h> on x86_64.
        assert_eq!(ioc(IOC_READ, EVIOCGVERSION, 4), 0x8004_4501);
        assert_eq!(ioc(IOC_READ, EVIOCGID, 8), 0x8008_4502);
        assert_eq!(ioc(IOC_READ, EVIOCGNAME, 256), 0x8100_4506);
        assert_eq!(ioc(IOC_WRITE, EVIOCGRAB, 4), 0x4004_4590);
        assert_eq!(ioc(IOC_READ, EVIOCGKEY, 96), 0x8060_4518);
        assert_eq!(ioc(IOC_READ, EVIOCGBIT + 1, 96), 0x8060_4521);
    }

    #[test]
    fn ioctls_fail_on_regular_files() {
        use std::os::fd::AsRawFd;

        let file = std::fs::File::open("/proc/self/status").unwrap();
        assert!(read_version(file.as_raw_fd()).is_err());
        assert!(read_name(file.as_raw_fd()).is_err());
    }

    #[test]
    fn bit_request_past_the_ioctl_range_is_invalid() {
        use std::os::fd::AsRawFd;

        let file = std::fs::File::open("/proc/self/status").unwrap();
        let mut bits = BitBuf::with_bits(8);

        for ty in [0xe0, 0xff] {
            let err = read_bits(file.as_raw_fd(), ty, &mut bits).unwrap_err();
            assert_eq!(err.raw_os_error(), Some(libc::EINVAL));
        }
        // In range, the request reaches the kernel, which refuses it for a regular file.
        let err = read_bits(file.as_raw_fd(), 0xdf, &mut bits).unwrap_err();
        assert_ne!(err.raw_os_error(), Some(libc::EINVAL));
    }
}
