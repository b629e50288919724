use cb_question_extract::models::{RawDocument, Subject};
use cb_question_extract::orchestrator::{App, Inputs};
use cb_question_extract::services::header_locator::segment;
use cb_question_extract::error::ValidationError;
use cb_question_extract::{AppError, Config, QuestionRecord};
use std::fs;
use std::process::Command;

/// 生成一个格式良好的题目区块
fn question_block(subject: Subject, index: usize) -> String {
    let id = format!("{:02x}{:06x}", subject as u8 + 0xa0, index);
    let values = match subject {
        Subject::Math => "SAT Math Algebra Linear equations in one variable ●●",
        Subject::ReadingWriting => "SAT Reading and Writing Craft and Structure Words in Context ●",
    };
    format!(
        "Question ID: {id} Question {n}.\n\
         Assessment Test Domain Skill Difficulty\n\
         {values}\n\
         Which value satisfies the condition described here?\n\
         A. first option\n\
         B. second option\n\
         C. third option\n\
         D. fourth option\n\
         ID: {id} Answer\n\
         Correct Answer: B\n\
         Rationale\n\
         Choice B is correct.\n",
        n = index + 1
    )
}

/// 生成一份试卷：每页两道题，页之间用换页符分隔
fn fixture_pages(subject: Subject, count: usize) -> Vec<String> {
    (0..count)
        .collect::<Vec<_>>()
        .chunks(2)
        .map(|chunk| chunk.iter().map(|i| question_block(subject, *i)).collect())
        .collect()
}

fn fixture(subject: Subject, count: usize) -> RawDocument {
    RawDocument::from_pages(&fixture_pages(subject, count), format!("{}.txt", subject.short_name()), subject)
}

#[tokio::test]
async fn test_complete_documents_produce_all_records() {
    let app = App::new(Config::default());
    let records = app
        .process_documents(vec![fixture(Subject::Math, 50), fixture(Subject::ReadingWriting, 50)])
        .await
        .expect("完整输入应该通过校验");

    assert_eq!(records.len(), 100);
    assert!(records.iter().all(QuestionRecord::is_mcq));
    assert!(records.iter().all(|r| r.answer.as_deref() == Some("B")));
    assert_eq!(records.iter().filter(|r| r.test == "Math").count(), 50);
    assert_eq!(records.iter().filter(|r| r.test == "Reading and Writing").count(), 50);

    // 顺序：Math 在前，页内顺序保持
    assert_eq!(records[0].number, Some(1));
    assert_eq!(records[0].pages, vec![1]);
    assert_eq!(records[49].pages, vec![25]);
    assert_eq!(records[50].domain, "Craft and Structure");
    assert_eq!(records[50].skill, "Words in Context");
    assert_eq!(
        records[0].stem,
        "Which value satisfies the condition described here?"
    );
}

#[tokio::test]
async fn test_duplicate_id_leaves_document_short_and_fails() {
    // 50 个锚点，其中一个 ID 重复：去重后只剩 49 道
    let mut pages = fixture_pages(Subject::Math, 49);
    if let Some(last) = pages.last_mut() {
        last.push_str(&question_block(Subject::Math, 0));
    }
    let math = RawDocument::from_pages(&pages, "math.txt", Subject::Math);
    assert_eq!(segment(&math).len(), 50);

    let app = App::new(Config::default());
    let err = app
        .process_documents(vec![math, fixture(Subject::ReadingWriting, 50)])
        .await
        .expect_err("49 道题应该校验失败");

    let AppError::Validation(ValidationError::Incomplete {
        math,
        reading_writing,
        total,
        math_ids,
        reading_writing_ids,
        ..
    }) = err
    else {
        panic!("应该是校验错误");
    };
    assert_eq!((math, reading_writing, total), (49, 50, 99));
    assert_eq!(math_ids.len(), 5);
    assert_eq!(reading_writing_ids.len(), 5);
    assert_eq!(math_ids[0], "a0000000");
    assert_eq!(reading_writing_ids[0], "a1000000");
}

#[test]
fn test_oversized_choice_discards_whole_set() {
    let block = question_block(Subject::Math, 0).replace("C. third option", &format!("C. {}", "long ".repeat(200)));
    let document = RawDocument::from_pages(&[block], "math.txt", Subject::Math);

    let records = tokio_test::block_on(async {
        let config = Config {
            expected_per_test: 1,
            min_mcq: 0,
            ..Config::default()
        };
        let app = App::new(config);
        app.process_documents(vec![document, fixture(Subject::ReadingWriting, 1)])
            .await
            .expect("数量满足时应该成功")
    });

    assert_eq!(records.len(), 2);
    assert!(records[0].choices.is_none());
    // 有字母答案却没有选项：答案清空
    assert!(records[0].answer.is_none());
    assert!(records[1].is_mcq());
}

#[tokio::test]
async fn test_inline_composite_row_recovers_metadata() {
    let block = "Question ID: 0d0d0d0d\n\
                 Assessment Test Domain Skill Difficulty SAT Math Geometry and Trigonometry Circles Hard\n\
                 What is the radius?\n\
                 ID: 0d0d0d0d Answer\n\
                 Correct Answer: 3.5\n";
    let config = Config {
        expected_per_test: 1,
        min_mcq: 0,
        ..Config::default()
    };
    let records = App::new(config)
        .process_documents(vec![
            RawDocument::from_pages(&[block], "math.txt", Subject::Math),
            fixture(Subject::ReadingWriting, 1),
        ])
        .await
        .expect("数量满足时应该成功");

    let record = &records[0];
    assert_eq!(record.domain, "Geometry and Trigonometry");
    assert_eq!(record.skill, "Circles");
    assert_eq!(record.difficulty, cb_question_extract::Difficulty::Hard);
    assert_eq!(record.stem, "What is the radius?");
    assert!(record.choices.is_none());
    assert_eq!(record.answer.as_deref(), Some("3.5"));
}

#[test]
fn test_mismatched_answer_id_yields_no_answer() {
    let block = question_block(Subject::Math, 0).replace("ID: a0000000 Answer", "ID: ffffffff Answer");
    let document = RawDocument::from_pages(&[block], "math.txt", Subject::Math);
    let blocks = segment(&document);
    assert_eq!(blocks.len(), 1);

    let flow = cb_question_extract::QuestionFlow::new(&Config::default());
    let ctx = cb_question_extract::BlockCtx::new(Subject::Math, 1, blocks[0].id.clone());
    let record = flow.run(&document, &blocks[0], &ctx);
    assert!(record.answer.is_none());
    assert!(record.rationale.is_none());
}

#[test]
fn test_blocks_partition_text() {
    let document = fixture(Subject::Math, 6);
    let blocks = segment(&document);
    assert_eq!(blocks.len(), 6);
    for pair in blocks.windows(2) {
        assert_eq!(pair[0].end, pair[1].start);
    }
    assert_eq!(blocks.last().map(|b| b.end), Some(document.text.len()));
}

#[tokio::test]
async fn test_run_writes_json_output() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path();
    let math = dir.join("math.txt");
    let rw = dir.join("rw.txt");
    fs::write(&math, fixture_pages(Subject::Math, 50).join("\u{000C}")).unwrap();
    fs::write(&rw, fixture_pages(Subject::ReadingWriting, 50).join("\u{000C}")).unwrap();

    let inputs = Inputs {
        math,
        reading_writing: rw,
        out: dir.join("out").join("questions.json"),
        image_dir: dir.join("imgs"),
    };
    let summary = App::new(Config::default()).run(&inputs).await.unwrap();
    assert_eq!((summary.math, summary.reading_writing, summary.total()), (50, 50, 100));

    let parsed: Vec<serde_json::Value> =
        serde_json::from_str(&fs::read_to_string(&inputs.out).unwrap()).unwrap();
    assert_eq!(parsed.len(), 100);
    assert_eq!(parsed[0]["difficulty"], "Medium");
    assert!(parsed[0]["images"].as_array().unwrap().is_empty());
    assert_eq!(parsed[0]["choices"][1]["label"], "B");
}

#[test]
fn test_binary_exit_codes() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path();
    let math = dir.join("math.txt");
    let rw = dir.join("rw.txt");
    let out = dir.join("questions.json");
    fs::write(&math, fixture_pages(Subject::Math, 50).join("\u{000C}")).unwrap();
    fs::write(&rw, fixture_pages(Subject::ReadingWriting, 50).join("\u{000C}")).unwrap();

    let run = || {
        Command::new(env!("CARGO_BIN_EXE_cb_question_extract"))
            .arg("--math")
            .arg(&math)
            .arg("--rw")
            .arg(&rw)
            .arg("--out")
            .arg(&out)
            .arg("--imgdir")
            .arg(dir.join("imgs"))
            .output()
            .unwrap()
    };

    let output = run();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Math: 50, R&W: 50, Total: 100"));
    assert!(out.exists());

    // 少一道题：非零退出，不写输出
    fs::remove_file(&out).unwrap();
    fs::write(&math, fixture_pages(Subject::Math, 49).join("\u{000C}")).unwrap();
    let output = run();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Math=49"));
    assert!(!out.exists());
}
