//! Named pipe reader
//!
//! The FTP server writes its transfer log into a FIFO. Each time the writer
//! closes its end the reader sees end of file; the pipe is then opened again
//! and the loop blocks until the next writer appears.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader};
use std::os::unix::fs::{FileTypeExt, OpenOptionsExt};
use std::path::Path;

use nix::sys::stat::Mode;
use nix::unistd::mkfifo;

use crate::dispatcher::Dispatcher;
use crate::logging::{debug, error, log};
use crate::shutdown::is_shutdown_requested;

/// Makes sure `path` is a named pipe, creating it (mode 0600) if missing
///
/// # Errors
/// - The path exists but is not a FIFO
/// - The FIFO cannot be created
pub fn ensure_fifo(path: &Path) -> io::Result<()> {
    match fs::metadata(path) {
        Ok(meta) if meta.file_type().is_fifo() => Ok(()),
        Ok(_) => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} exists and is not a named pipe", path.display()),
        )),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            mkfifo(path, Mode::S_IRUSR | Mode::S_IWUSR).map_err(|errno| {
                io::Error::new(
                    io::Error::from(errno).kind(),
                    format!("Failed to create named pipe {}: {}", path.display(), errno),
                )
            })?;
            let _ = log(&format!("Created named pipe {}", path.display()));
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Reads the pipe until shutdown is requested
///
/// Returns the number of non-empty lines read. Only a failure to open the
/// pipe is returned as an error; read errors are logged and the pipe is
/// reopened.
pub fn run(path: &Path, dispatcher: &Dispatcher<'_>) -> io::Result<u64> {
    ensure_fifo(path)?;

    let mut total = 0;
    while !is_shutdown_requested() {
        let _ = debug(&format!("Waiting for a writer on {}", path.display()));
        let file = File::open(path).map_err(|e| {
            io::Error::new(
                e.kind(),
                format!("Failed to open pipe {}: {}", path.display(), e),
            )
        })?;
        if is_shutdown_requested() {
            break;
        }

        match read_lines(BufReader::new(file), dispatcher, &mut total) {
            Ok(()) => {
                let _ = debug(&format!("Writer closed {}, reopening", path.display()));
            }
            Err(e) => {
                let _ = error(&format!("Error reading pipe {}: {}, reopening", path.display(), e));
            }
        }
    }

    Ok(total)
}

/// Feeds every line of `reader` to the dispatcher until end of file
///
/// Line endings (`\n` or `\r\n`) are stripped, blank lines ignored and
/// invalid UTF-8 replaced. `count` is increased for each line handed on.
pub fn read_lines<R: BufRead>(
    mut reader: R,
    dispatcher: &Dispatcher<'_>,
    count: &mut u64,
) -> io::Result<()> {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }

        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\n', '\r']);
        if line.trim().is_empty() {
            continue;
        }

        dispatcher.process_line(line);
        *count += 1;

        if is_shutdown_requested() {
            return Ok(());
        }
    }
}

/// Unblocks a reader waiting in `open()` for a writer
///
/// Opening the write end without blocking fails when nobody is reading,
/// which is fine: there is nothing to wake then.
pub fn wake_reader(path: &Path) {
    let _ = OpenOptions::new()
        .write(true)
        .custom_flags(libc::O_NONBLOCK)
        .open(path);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FileConfig, Outputs};
    use crate::shutdown::{request_shutdown, reset_shutdown_for_tests};
    use serial_test::serial;
    use std::io::{Cursor, Write};
    use std::thread;
    use std::time::{Duration, Instant};
    use tempfile::tempdir;

    const LINE_A: &str =
        "Sun Jun 17 14:33:58 2018 0 hostname.domain.com 5 /srv/ftp/foo a _ o r myuser ftp 0 * c";
    const LINE_B: &str =
        "Sun Jun 17 14:35:02 2018 7 10.1.2.3 9000 /srv/ftp/bar b _ i r other ftps 0 * i";

    fn file_outputs(path: &Path) -> Outputs {
        Outputs {
            file: vec![FileConfig {
                path: path.to_str().unwrap().to_string(),
            }],
            ..Outputs::default()
        }
    }

    #[test]
    #[serial]
    fn test_read_lines_strips_endings_and_skips_invalid() {
        reset_shutdown_for_tests();
        let dir = tempdir().unwrap();
        let out = dir.path().join("out.log");
        let outputs = file_outputs(&out);
        let dispatcher = Dispatcher::new(&outputs);

        let input = format!("{}\r\n\njunk line\n{}", LINE_A, LINE_B);
        let mut count = 0;
        read_lines(Cursor::new(input.into_bytes()), &dispatcher, &mut count).unwrap();

        assert_eq!(count, 3);
        let contents = fs::read_to_string(&out).unwrap();
        assert_eq!(contents, format!("{}\n{}\n", LINE_A, LINE_B));
    }

    #[test]
    #[serial]
    fn test_read_lines_replaces_invalid_utf8() {
        reset_shutdown_for_tests();
        let dir = tempdir().unwrap();
        let out = dir.path().join("out.log");
        let outputs = file_outputs(&out);
        let dispatcher = Dispatcher::new(&outputs);

        let mut input = b"Sun Jun 17 14:33:58 2018 0 host 5 /srv/ftp/caf".to_vec();
        input.push(0xE9);
        input.extend_from_slice(b" a _ o r myuser ftp 0 * c\n");
        let mut count = 0;
        read_lines(Cursor::new(input), &dispatcher, &mut count).unwrap();

        assert_eq!(count, 1);
        let contents = fs::read_to_string(&out).unwrap();
        assert!(contents.contains("/srv/ftp/caf\u{FFFD}"));
    }

    #[test]
    #[serial]
    fn test_read_lines_stops_on_shutdown() {
        reset_shutdown_for_tests();
        let outputs = Outputs::default();
        let dispatcher = Dispatcher::new(&outputs);

        request_shutdown();
        let input = format!("{}\n{}\n", LINE_A, LINE_B);
        let mut count = 0;
        read_lines(Cursor::new(input.into_bytes()), &dispatcher, &mut count).unwrap();
        assert_eq!(count, 1);
        reset_shutdown_for_tests();
    }

    #[test]
    fn test_ensure_fifo() {
        let dir = tempdir().unwrap();
        let fifo = dir.path().join("xfer.fifo");

        ensure_fifo(&fifo).unwrap();
        assert!(fs::metadata(&fifo).unwrap().file_type().is_fifo());
        // Existing FIFO is accepted as-is
        ensure_fifo(&fifo).unwrap();

        let regular = dir.path().join("plain.txt");
        fs::write(&regular, "x").unwrap();
        let err = ensure_fifo(&regular).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_ensure_fifo_in_missing_directory() {
        let dir = tempdir().unwrap();
        let fifo = dir.path().join("nope").join("xfer.fifo");
        assert!(ensure_fifo(&fifo).is_err());
    }

    #[test]
    #[serial]
    fn test_run_survives_writer_reconnects() {
        reset_shutdown_for_tests();
        let dir = tempdir().unwrap();
        let fifo = dir.path().join("xfer.fifo");
        let out = dir.path().join("out.log");
        ensure_fifo(&fifo).unwrap();

        let reader_fifo = fifo.clone();
        let reader_out = out.clone();
        let reader = thread::spawn(move || {
            let outputs = file_outputs(&reader_out);
            let dispatcher = Dispatcher::new(&outputs);
            run(&reader_fifo, &dispatcher).unwrap()
        });

        // Two separate writer sessions
        for line in [LINE_A, LINE_B] {
            let mut writer = OpenOptions::new().write(true).open(&fifo).unwrap();
            writeln!(writer, "{}", line).unwrap();
        }

        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            let contents = fs::read_to_string(&out).unwrap_or_default();
            if contents.lines().count() == 2 {
                assert_eq!(contents, format!("{}\n{}\n", LINE_A, LINE_B));
                break;
            }
            assert!(Instant::now() < deadline, "lines never reached the file sink");
            thread::sleep(Duration::from_millis(20));
        }

        request_shutdown();
        while !reader.is_finished() {
            assert!(Instant::now() < deadline, "reader did not stop");
            wake_reader(&fifo);
            thread::sleep(Duration::from_millis(20));
        }
        assert_eq!(reader.join().unwrap(), 2);
        reset_shutdown_for_tests();
    }
}
