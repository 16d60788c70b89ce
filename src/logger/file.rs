/// File persistence for log output
///
/// Appends plain-text log lines to a daily file in the logs directory
/// (`omniscient_YYYY-MM-DD.log`). The writer is buffered and re-opened when
/// the date rolls over.
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::sync::Mutex;

use chrono::Local;
use once_cell::sync::Lazy;

use crate::paths;

struct FileSink {
    date: String,
    writer: Option<BufWriter<File>>,
}

static FILE_SINK: Lazy<Mutex<FileSink>> = Lazy::new(|| {
    Mutex::new(FileSink {
        date: String::new(),
        writer: None,
    })
});

/// Open (or re-open) the daily log file
///
/// Safe to call multiple times; failures are swallowed so logging never
/// takes the application down.
pub fn init_file_logging() {
    if let Ok(mut sink) = FILE_SINK.lock() {
        reopen_if_needed(&mut sink);
    }
}

fn reopen_if_needed(sink: &mut FileSink) {
    let today = Local::now().format("%Y-%m-%d").to_string();
    if sink.writer.is_some() && sink.date == today {
        return;
    }

    let path = paths::get_logs_directory().join(format!("omniscient_{}.log", today));
    match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => {
            sink.date = today;
            sink.writer = Some(BufWriter::new(file));
        }
        Err(_) => {
            sink.writer = None;
        }
    }
}

/// Append a single line to the current daily log file
pub fn write_to_file(line: &str) {
    if let Ok(mut sink) = FILE_SINK.lock() {
        reopen_if_needed(&mut sink);
        if let Some(writer) = sink.writer.as_mut() {
            let _ = writeln!(writer, "{}", line);
        }
    }
}

/// Flush buffered log output to disk
pub fn flush_file_logging() {
    if let Ok(mut sink) = FILE_SINK.lock() {
        if let Some(writer) = sink.writer.as_mut() {
            let _ = writer.flush();
        }
    }
}
