//! Batch parsing of many buffers
//!
//! Sequential and parallel modes produce the same results in the same
//! order. Parallel mode splits the buffers into contiguous chunks, one per
//! scoped worker thread; each worker owns the scanners it opens.

use crate::config::compile_time::batch::*;
use crate::config::runtime::RuntimeConfig;
use crate::logging::codes;
use crate::source::SourceBuffer;
use crate::syntax::{self, ParseError, ParseOutput};
use std::thread;
use std::time::{Duration, Instant};

/// Batch configuration
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub max_threads: usize,
    /// Preferences applied to every buffer
    pub runtime: RuntimeConfig,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_threads: thread::available_parallelism()
                .map(|n| n.get().min(MAX_WORKER_THREADS))
                .unwrap_or(4),
            runtime: RuntimeConfig::default(),
        }
    }
}

/// Per-buffer outcomes, in input order
#[derive(Debug)]
pub struct BatchResults {
    pub outcomes: Vec<(String, Result<ParseOutput, ParseError>)>,
    pub processing_duration: Duration,
}

impl BatchResults {
    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|(_, result)| result.is_ok()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.outcomes.len() - self.success_count()
    }

    pub fn success_rate(&self) -> f64 {
        if self.outcomes.is_empty() {
            0.0
        } else {
            self.success_count() as f64 / self.outcomes.len() as f64
        }
    }

    pub fn get(&self, name: &str) -> Option<&Result<ParseOutput, ParseError>> {
        self.outcomes
            .iter()
            .find(|(candidate, _)| candidate == name)
            .map(|(_, result)| result)
    }

    pub fn summary(&self) -> String {
        format!(
            "Batch parsing completed: {} buffers, {} successful ({:.1}%), {} failed, {:.2}s total",
            self.outcomes.len(),
            self.success_count(),
            self.success_rate() * 100.0,
            self.failure_count(),
            self.processing_duration.as_secs_f64()
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Too many buffers: {count} (max: {max})")]
    TooManyBuffers { count: usize, max: usize },

    #[error("Worker thread {worker} panicked")]
    WorkerPanicked { worker: usize },
}

impl BatchError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            Self::TooManyBuffers { .. } => codes::batch::TOO_MANY_BUFFERS,
            Self::WorkerPanicked { .. } => codes::batch::WORKER_FAILURE,
        }
    }
}

fn check_batch_size(buffers: &[SourceBuffer]) -> Result<(), BatchError> {
    if buffers.len() > MAX_BUFFERS_PER_BATCH {
        let error = BatchError::TooManyBuffers {
            count: buffers.len(),
            max: MAX_BUFFERS_PER_BATCH,
        };
        crate::log_error!(error.error_code(), &error.to_string());
        return Err(error);
    }
    Ok(())
}

fn parse_one(
    buffer: &SourceBuffer,
    config: &RuntimeConfig,
) -> (String, Result<ParseOutput, ParseError>) {
    (buffer.name().to_string(), syntax::parse_buffer(buffer, config))
}

fn log_completion(mode: &str, results: &BatchResults, threads: usize) {
    crate::log_success!(
        codes::success::BATCH_COMPLETE,
        "Batch parsing completed",
        "mode" => mode,
        "buffers" => results.outcomes.len(),
        "successful" => results.success_count(),
        "failed" => results.failure_count(),
        "threads_used" => threads,
        "duration_ms" => format!("{:.2}", results.processing_duration.as_secs_f64() * 1000.0)
    );
}

/// Parse every buffer on the calling thread
pub fn parse_batch_sequential(
    buffers: &[SourceBuffer],
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    check_batch_size(buffers)?;
    let start_time = Instant::now();

    crate::log_info!("Starting sequential batch parsing", "buffers" => buffers.len());

    let outcomes = buffers
        .iter()
        .map(|buffer| parse_one(buffer, &config.runtime))
        .collect();

    let results = BatchResults {
        outcomes,
        processing_duration: start_time.elapsed(),
    };
    log_completion("sequential", &results, 1);
    Ok(results)
}

/// Parse buffers on up to `config.max_threads` scoped workers
pub fn parse_batch_parallel(
    buffers: &[SourceBuffer],
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    check_batch_size(buffers)?;
    let start_time = Instant::now();

    let threads = config.max_threads.clamp(1, MAX_WORKER_THREADS);
    if buffers.is_empty() {
        let results = BatchResults {
            outcomes: Vec::new(),
            processing_duration: start_time.elapsed(),
        };
        log_completion("parallel", &results, 0);
        return Ok(results);
    }

    let chunk_size = buffers.len().div_ceil(threads);

    crate::log_info!("Starting parallel batch parsing",
        "buffers" => buffers.len(),
        "threads" => threads,
        "chunk_size" => chunk_size
    );

    let runtime = &config.runtime;
    let chunks: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = buffers
            .chunks(chunk_size)
            .map(|chunk| {
                scope.spawn(move || {
                    chunk
                        .iter()
                        .map(|buffer| parse_one(buffer, runtime))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        handles.into_iter().map(|handle| handle.join()).collect()
    });

    let mut outcomes = Vec::with_capacity(buffers.len());
    for (worker, chunk) in chunks.into_iter().enumerate() {
        match chunk {
            Ok(chunk_outcomes) => outcomes.extend(chunk_outcomes),
            Err(_) => {
                let error = BatchError::WorkerPanicked { worker };
                crate::log_error!(error.error_code(), &error.to_string());
                return Err(error);
            }
        }
    }

    let results = BatchResults {
        outcomes,
        processing_duration: start_time.elapsed(),
    };
    log_completion("parallel", &results, threads);
    Ok(results)
}

/// Parallel when more than one worker is allowed, sequential otherwise
pub fn parse_batch(
    buffers: &[SourceBuffer],
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    if config.max_threads <= 1 {
        parse_batch_sequential(buffers, config)
    } else {
        parse_batch_parallel(buffers, config)
    }
}
