//! Property-based tests for the stage chain.

use std::io::Cursor;

use pipecat::{CancelToken, ExecutorKind, FailurePolicy, LineSource, Options, Pipeline, Sink};
use proptest::prelude::*;

/// Run `lines` (each given a trailing newline) through a fresh pipeline.
fn render(options: &Options, lines: &[String]) -> Vec<String> {
    let text: String = lines.iter().map(|l| format!("{l}\n")).collect();
    let source = LineSource::from_reader("prop", Cursor::new(text.into_bytes()));
    let mut pipeline = Pipeline::from_options(options);
    let mut sink = Sink::new(Vec::new(), FailurePolicy::Abort);
    pipeline
        .run_source(source, &mut sink, &CancelToken::new())
        .unwrap();
    let out = String::from_utf8(sink.into_inner().unwrap()).unwrap();
    out.lines().map(str::to_string).collect()
}

fn squeezed_len(lines: &[String]) -> usize {
    let mut count = 0;
    let mut last_blank = false;
    for line in lines {
        if line.is_empty() && last_blank {
            continue;
        }
        last_blank = line.is_empty();
        count += 1;
    }
    count
}

fn line_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "[a-c\\t \\\\]{1,6}",
    ]
}

fn lines_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(line_strategy(), 0..40)
}

fn options_strategy() -> impl Strategy<Value = Options> {
    (any::<[bool; 5]>(), any::<bool>()).prop_map(|(flags, use_pull)| Options {
        squeeze_blank: flags[0],
        number: flags[1],
        number_nonblank: flags[2],
        show_ends: flags[3],
        show_tabs: flags[4],
        executor: if use_pull {
            ExecutorKind::Pull
        } else {
            ExecutorKind::Threaded
        },
        ..Options::default()
    })
}

fn pull(options: Options) -> Options {
    Options {
        executor: ExecutorKind::Pull,
        ..options
    }
}

proptest! {
    #[test]
    fn test_no_stage_adds_lines(lines in lines_strategy(), options in options_strategy()) {
        let out = render(&options, &lines);
        let expected = if options.squeeze_blank { squeezed_len(&lines) } else { lines.len() };
        prop_assert_eq!(out.len(), expected);
    }

    #[test]
    fn test_squeeze_is_idempotent(lines in lines_strategy()) {
        let options = pull(Options { squeeze_blank: true, ..Options::default() });
        let once = render(&options, &lines);
        let twice = render(&options, &once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn test_number_all_is_gapless(lines in lines_strategy()) {
        let options = pull(Options { number: true, ..Options::default() });
        let out = render(&options, &lines);
        prop_assert_eq!(out.len(), lines.len());
        for (i, (rendered, input)) in out.iter().zip(&lines).enumerate() {
            prop_assert_eq!(rendered, &format!("{}: {}", i + 1, input));
        }
    }

    #[test]
    fn test_number_nonblank_labels_only_content(lines in lines_strategy()) {
        let options = pull(Options { number_nonblank: true, ..Options::default() });
        let out = render(&options, &lines);
        let mut n = 0;
        for (rendered, input) in out.iter().zip(&lines) {
            if input.is_empty() {
                prop_assert!(rendered.is_empty());
            } else {
                n += 1;
                prop_assert_eq!(rendered, &format!("{n}:{input}"));
            }
        }
    }

    #[test]
    fn test_show_ends_adds_one_marker(lines in lines_strategy(), options in options_strategy()) {
        let with_ends = Options { show_ends: true, ..options.clone() };
        let without = Options { show_ends: false, ..options };
        let marked = render(&with_ends, &lines);
        let plain = render(&without, &lines);
        prop_assert_eq!(marked.len(), plain.len());
        for (m, p) in marked.iter().zip(&plain) {
            prop_assert_eq!(m, &format!("{p}$"));
        }
    }

    #[test]
    fn test_show_tabs_replaces_only_tabs(lines in lines_strategy()) {
        let options = pull(Options { show_tabs: true, ..Options::default() });
        let out = render(&options, &lines);
        let expected: Vec<String> = lines.iter().map(|l| l.replace('\t', "^I")).collect();
        prop_assert_eq!(out, expected);
    }

    #[test]
    fn test_executors_agree(lines in lines_strategy(), options in options_strategy()) {
        let threaded = Options { executor: ExecutorKind::Threaded, ..options.clone() };
        prop_assert_eq!(render(&threaded, &lines), render(&pull(options), &lines));
    }
}
