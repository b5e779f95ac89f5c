//! Pipeline executors.
//!
//! Two schedulers move records from a [`LineSource`](crate::LineSource), or
//! any other record iterator, through a slice of stages into a [`Sink`]:
//!
//! - [`execute_threaded`] runs the source and every stage on its own scoped
//!   thread, connected by zero-capacity channels. A producer cannot get more
//!   than one record ahead of its consumer.
//! - [`execute_pull`] pulls one record at a time through a lazy
//!   [`StageChain`] on the calling thread.
//!
//! Both preserve record order exactly, forward failure records around the
//! stages untouched, and stop at the first failure or closed output. They
//! produce identical output for the same input and stages.

use std::io::Write;
use std::mem;
use std::thread;

use crossbeam_channel::{Receiver, Sender, bounded, select};

use crate::cancel::CancelToken;
use crate::error::{PipelineError, Result};
use crate::record::{Line, Record};
use crate::sink::{Flow, Sink};
use crate::stage::Stage;

/// Push a line through a slice of stages in sequence.
///
/// Returns `None` as soon as any stage suppresses it.
pub fn push_through_stages(line: Line, stages: &mut [Box<dyn Stage>]) -> Option<Line> {
    stages
        .iter_mut()
        .try_fold(line, |line, stage| stage.process(line))
}

/// Lazy record-at-a-time stage chain over any record iterator.
///
/// Each call to `next` pulls input records until one survives every stage
/// (or a failure record arrives, which is returned without touching the
/// stages).
pub struct StageChain<'a, I> {
    input: I,
    stages: &'a mut [Box<dyn Stage>],
}

impl<'a, I: Iterator<Item = Record>> StageChain<'a, I> {
    pub fn new(input: I, stages: &'a mut [Box<dyn Stage>]) -> Self {
        Self { input, stages }
    }
}

impl<I: Iterator<Item = Record>> Iterator for StageChain<'_, I> {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        loop {
            match self.input.next()? {
                Ok(line) => {
                    if let Some(line) = push_through_stages(line, self.stages) {
                        return Some(Ok(line));
                    }
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Execute one file's pipeline record-at-a-time on the calling thread.
///
/// The cancel token is checked before every pull from the source.
pub fn execute_pull<I: Iterator<Item = Record>, W: Write>(
    source: I,
    stages: &mut [Box<dyn Stage>],
    sink: &mut Sink<W>,
    cancel: &CancelToken,
) -> Result<Flow> {
    let mut chain = StageChain::new(source, stages);
    loop {
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
        let Some(record) = chain.next() else {
            return Ok(Flow::Continue);
        };
        match sink.accept(record)? {
            Flow::Continue => {}
            flow => return Ok(flow),
        }
    }
}

/// Execute one file's pipeline with one thread per source and stage.
///
/// The sink runs on the calling thread. When it stops early it drops its
/// receiver; every upstream thread then fails its next send and returns,
/// which closes the source file. All threads are joined before returning.
pub fn execute_threaded<I: Iterator<Item = Record> + Send, W: Write>(
    source: I,
    stages: &mut [Box<dyn Stage>],
    sink: &mut Sink<W>,
    cancel: &CancelToken,
) -> Result<Flow> {
    thread::scope(|scope| {
        let (tx, mut rx) = bounded::<Record>(0);
        let stop = cancel.signal().clone();
        scope.spawn(move || produce(source, tx, stop));

        for stage in stages.iter_mut() {
            let (next_tx, next_rx) = bounded::<Record>(0);
            let input = mem::replace(&mut rx, next_rx);
            let stop = cancel.signal().clone();
            scope.spawn(move || transform(&mut **stage, input, next_tx, stop));
        }

        consume(rx, sink, cancel)
    })
}

fn produce<I: Iterator<Item = Record>>(source: I, output: Sender<Record>, stop: Receiver<()>) {
    for record in source {
        let sent = select! {
            send(output, record) -> res => res.is_ok(),
            recv(stop) -> _ => false,
        };
        if !sent {
            return;
        }
    }
}

fn transform(
    stage: &mut dyn Stage,
    input: Receiver<Record>,
    output: Sender<Record>,
    stop: Receiver<()>,
) {
    loop {
        let received = select! {
            recv(input) -> msg => msg.ok(),
            recv(stop) -> _ => None,
        };
        let Some(record) = received else {
            return;
        };

        let record = match record {
            Ok(line) => match stage.process(line) {
                Some(line) => Ok(line),
                None => continue,
            },
            Err(e) => Err(e),
        };

        let sent = select! {
            send(output, record) -> res => res.is_ok(),
            recv(stop) -> _ => false,
        };
        if !sent {
            return;
        }
    }
}

fn consume<W: Write>(
    input: Receiver<Record>,
    sink: &mut Sink<W>,
    cancel: &CancelToken,
) -> Result<Flow> {
    loop {
        let received = select! {
            recv(input) -> msg => msg.ok(),
            recv(cancel.signal()) -> _ => None,
        };
        // Upstream hangs up both at EOF and when it observed the stop signal.
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
        let Some(record) = received else {
            return Ok(Flow::Continue);
        };
        match sink.accept(record)? {
            Flow::Continue => {}
            flow => return Ok(flow),
        }
    }
}
