use crossterm::{
    ExecutableCommand, cursor,
    terminal::{Clear, ClearType},
};
use std::io::{self, Write};
use std::time::{Duration, Instant};

const SPINNER: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Spinner line on stderr while the selector walks the tree. A disabled
/// instance only counts.
pub struct ScanProgress {
    enabled: bool,
    start_time: Instant,
    update_interval: Duration,
    last_update: Instant,
    scanned_count: usize,
    admitted_count: usize,
}

impl ScanProgress {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            start_time: Instant::now(),
            update_interval: Duration::from_millis(250),
            last_update: Instant::now(),
            scanned_count: 0,
            admitted_count: 0,
        }
    }

    pub fn update(&mut self, admitted: bool) {
        self.scanned_count += 1;
        if admitted {
            self.admitted_count += 1;
        }

        if !self.enabled {
            return;
        }
        let now = Instant::now();
        if now.duration_since(self.last_update) < self.update_interval {
            return;
        }
        self.last_update = now;
        // Drawing is cosmetic; a broken terminal must not abort the scan.
        let _ = self.draw(now);
    }

    fn draw(&self, now: Instant) -> io::Result<()> {
        let elapsed = now.duration_since(self.start_time);
        let spinner_idx = (elapsed.as_millis() / 100) as usize % SPINNER.len();

        let mut stderr = io::stderr();
        stderr.execute(cursor::SavePosition)?;
        stderr.execute(Clear(ClearType::CurrentLine))?;
        write!(
            stderr,
            "{} Scanning files: {} scanned, {} admitted ({:.1} files/sec)",
            SPINNER[spinner_idx],
            self.scanned_count,
            self.admitted_count,
            rate(self.scanned_count, elapsed)
        )?;
        stderr.flush()?;
        stderr.execute(cursor::RestorePosition)?;
        Ok(())
    }

    pub fn finish(&self) {
        if !self.enabled {
            return;
        }
        let elapsed = self.start_time.elapsed();
        let mut stderr = io::stderr();
        let _ = stderr.execute(Clear(ClearType::CurrentLine));
        let _ = writeln!(
            stderr,
            "✓ Scan complete: {} files scanned, {} admitted in {:.1}s ({:.1} files/sec)",
            self.scanned_count,
            self.admitted_count,
            elapsed.as_secs_f32(),
            rate(self.scanned_count, elapsed)
        );
    }

    pub fn scanned(&self) -> usize {
        self.scanned_count
    }

    pub fn admitted(&self) -> usize {
        self.admitted_count
    }
}

fn rate(count: usize, elapsed: Duration) -> f32 {
    let secs = elapsed.as_secs_f32();
    if secs > 0.0 { count as f32 / secs } else { 0.0 }
}
