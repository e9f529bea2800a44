use super::alloc;
use crate::common::units::{BYTES, KIBIBYTES};

#[cfg(target_os = "linux")]
use std::fs::File;
#[cfg(target_os = "linux")]
use std::io::{Read, Seek};

/// Memory statistics of the running process, named after the gauges they
/// are reported as. Anything the platform cannot supply stays zero.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MemStats {
    pub alloc: u64,
    pub buck_hash_sys: u64,
    pub frees: u64,
    pub gc_cpu_fraction: f64,
    pub heap_alloc: u64,
    pub heap_idle: u64,
    pub heap_inuse: u64,
    pub heap_objects: u64,
    pub heap_released: u64,
    pub heap_sys: u64,
    pub num_gc: u32,
    pub sys: u64,
    pub total_alloc: u64,
}

impl MemStats {
    /// Gauge name and value pairs, in reporting order.
    pub fn gauges(&self) -> [(&'static str, f64); 13] {
        [
            ("Alloc", self.alloc as f64),
            ("BuckHashSys", self.buck_hash_sys as f64),
            ("Frees", self.frees as f64),
            ("GCCPUFraction", self.gc_cpu_fraction),
            ("HeapAlloc", self.heap_alloc as f64),
            ("HeapIdle", self.heap_idle as f64),
            ("HeapInuse", self.heap_inuse as f64),
            ("HeapObjects", self.heap_objects as f64),
            ("HeapReleased", self.heap_released as f64),
            ("HeapSys", self.heap_sys as f64),
            ("NumGC", self.num_gc as f64),
            ("Sys", self.sys as f64),
            ("TotalAlloc", self.total_alloc as f64),
        ]
    }
}

/// Process memory footprint in bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Footprint {
    virtual_size: u64,
    data_size: u64,
}

pub struct RuntimeReader {
    #[cfg(target_os = "linux")]
    statm: Option<File>,
    #[cfg(target_os = "linux")]
    page_size: u64,
}

impl Default for RuntimeReader {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeReader {
    pub fn new() -> Self {
        Self {
            #[cfg(target_os = "linux")]
            statm: File::open("/proc/self/statm").ok(),
            #[cfg(target_os = "linux")]
            page_size: page_size(),
        }
    }

    pub fn read(&mut self) -> MemStats {
        let heap = alloc::snapshot();
        let footprint = self.footprint();

        MemStats {
            alloc: heap.live_bytes,
            frees: heap.frees,
            heap_alloc: heap.live_bytes,
            heap_idle: footprint.data_size.saturating_sub(heap.live_bytes),
            heap_inuse: heap.live_bytes,
            heap_objects: heap.objects(),
            heap_sys: footprint.data_size,
            sys: footprint.virtual_size,
            total_alloc: heap.total_bytes,
            ..Default::default()
        }
    }

    #[cfg(target_os = "linux")]
    fn footprint(&mut self) -> Footprint {
        let Some(file) = self.statm.as_mut() else {
            return Footprint::default();
        };

        let mut data = String::new();
        if file.rewind().is_err() || file.read_to_string(&mut data).is_err() {
            return Footprint::default();
        }

        parse_statm(&data, self.page_size).unwrap_or_default()
    }

    #[cfg(not(target_os = "linux"))]
    fn footprint(&mut self) -> Footprint {
        Footprint {
            virtual_size: max_rss(),
            data_size: 0,
        }
    }
}

// /proc/self/statm: size resident shared text lib data dt, all in pages
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_statm(data: &str, page_size: u64) -> Option<Footprint> {
    let parts: Vec<u64> = data
        .split_whitespace()
        .map(|v| v.parse::<u64>())
        .collect::<Result<_, _>>()
        .ok()?;

    Some(Footprint {
        virtual_size: parts.first()? * page_size,
        data_size: parts.get(5)? * page_size,
    })
}

#[cfg(target_os = "linux")]
fn page_size() -> u64 {
    match unsafe { libc::sysconf(libc::_SC_PAGESIZE) } {
        size if size > 0 => size as u64,
        _ => 4 * KIBIBYTES,
    }
}

// `ru_maxrss` is in kibibytes except on macOS where it is in bytes
#[cfg_attr(target_os = "linux", allow(dead_code))]
fn max_rss() -> u64 {
    let mut rusage: libc::rusage = unsafe { std::mem::zeroed() };

    if unsafe { libc::getrusage(libc::RUSAGE_SELF, &mut rusage) } != 0 {
        return 0;
    }

    let unit = if cfg!(target_os = "macos") {
        BYTES
    } else {
        KIBIBYTES
    };

    (rusage.ru_maxrss.max(0) as u64) * unit
}
