use pipesim_core::config::Preset;
use pipesim_core::core::pipeline::stage::StageKind;
use pipesim_core::trace::{
    CommitRecord, CycleRecord, FlushCause, JsonTrace, StageStatus, TextTrace, TraceEvent,
    TraceSink, WriteEffect,
};
use pretty_assertions::assert_eq;

use crate::common::harness::TestContext;

fn sample() -> CycleRecord {
    CycleRecord {
        cycle: 3,
        pc: 12,
        speculative: true,
        stages: [
            StageStatus::Processing {
                text: "nop".into(),
                remaining: 1,
                bubble: false,
            },
            StageStatus::Idle,
            StageStatus::Processing {
                text: "nop".into(),
                remaining: 0,
                bubble: true,
            },
            StageStatus::Idle,
            StageStatus::Idle,
        ],
        commit: Some(CommitRecord {
            pc: 0,
            text: "addi x1, x0, 5".into(),
            bubble: false,
            write: Some(WriteEffect::Register { reg: 1, value: 5 }),
        }),
        events: vec![TraceEvent::Flush {
            cause: FlushCause::TakenBranch,
            squashed: 2,
            target: 16,
        }],
    }
}

#[test]
fn text_trace_layout() {
    let mut sink = TextTrace::new(Vec::new());
    sink.emit(&sample());
    let text = String::from_utf8(sink.finish().unwrap()).unwrap();
    let expected = "\
[CYCLE 3] [PC=12] [SPECULATIVE]
  Fetch:         processing nop (1 cycles remaining)
  Decode:        idle
  RegisterRead:  processing nop [stall] (0 cycles remaining)
  Execute:       idle
  Store:         idle
  COMMIT addi x1, x0, 5 (x1 <- 5)
  * flush (taken branch): 2 squashed, fetch 16
";
    assert_eq!(text, expected);
}

#[test]
fn bubble_commits_are_not_printed() {
    let mut record = sample();
    record.commit = Some(CommitRecord {
        pc: 4,
        text: "nop".into(),
        bubble: true,
        write: None,
    });
    let mut sink = TextTrace::new(Vec::new());
    sink.emit(&record);
    let text = String::from_utf8(sink.finish().unwrap()).unwrap();
    assert!(!text.contains("COMMIT"));
}

#[test]
fn json_trace_is_one_object_per_line() {
    let mut sink = JsonTrace::new(Vec::new());
    sink.emit(&sample());
    sink.emit(&sample());
    let text = String::from_utf8(sink.finish().unwrap()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);

    let value: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(value["cycle"], 3);
    assert_eq!(value["stages"][0]["state"], "processing");
    assert_eq!(value["stages"][1]["state"], "idle");
    assert_eq!(value["commit"]["write"]["kind"], "register");
    assert_eq!(value["events"][0]["event"], "flush");
    assert_eq!(value["events"][0]["cause"], "taken_branch");
}

#[test]
fn event_display() {
    let cases = [
        (
            TraceEvent::Stall {
                reg: 2,
                producer: StageKind::Execute,
                bubble: true,
            },
            "stall: x2 pending in Execute, bubble inserted",
        ),
        (
            TraceEvent::Prediction {
                pc: 8,
                taken: false,
                target: 12,
            },
            "predict branch at 8: not taken, fetch 12",
        ),
        (
            TraceEvent::PredictionCorrect { pc: 8 },
            "branch at 8 predicted correctly",
        ),
        (
            TraceEvent::SpeculationHold { pc: 4 },
            "branch at 4 held: prediction outstanding",
        ),
    ];
    for (event, text) in cases {
        assert_eq!(event.to_string(), text);
    }
    assert_eq!(
        WriteEffect::Memory { addr: 3, value: -1 }.to_string(),
        "mem[3] <- -1"
    );
}

#[test]
fn trace_of_real_run_reaches_every_stage() {
    let ctx = TestContext::preset(Preset::HazardControl);
    let (_, records) = ctx.run_traced("addi x1, x0, 5");
    for (cycle, kind) in StageKind::ALL.iter().enumerate() {
        assert!(
            matches!(records[cycle].stages[*kind as usize], StageStatus::Processing { .. }),
            "{kind} empty at cycle {cycle}"
        );
    }

    let mut sink = TextTrace::new(Vec::new());
    for r in &records {
        sink.emit(r);
    }
    let text = String::from_utf8(sink.finish().unwrap()).unwrap();
    assert!(text.starts_with("[CYCLE 0] [PC=4]\n"));
    assert!(text.contains("  COMMIT addi x1, x0, 5 (x1 <- 5)\n"));
}
