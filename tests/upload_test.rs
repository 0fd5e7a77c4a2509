use bulk_question_upload::infrastructure::{StoreCall, StoreOp};
use bulk_question_upload::{
    Collection, MemoryStore, Module, ProgressSink, Question, QuestionType, UploadError,
    UploadFlow, UploadProgress, UploadStage,
};
use serde_json::json;
use std::cell::RefCell;
use tokio_test::{assert_err, assert_ok};

fn question(reference_id: &str) -> Question {
    Question {
        reference_id: reference_id.to_string(),
        question_type: QuestionType::MultipleChoice,
        question_text: format!("Question {}", reference_id),
        instructions: String::new(),
        explanation: String::new(),
        difficulty: "easy".to_string(),
        tag: "Algebra".to_string(),
        answer_choices: vec!["1".to_string(), "2".to_string()],
        correct_answer: "2".to_string(),
    }
}

fn two_modules() -> Vec<Module> {
    vec![
        Module::new(1, vec![question("q1"), question("q2")]),
        Module::new(2, vec![question("q3")]),
    ]
}

fn four_modules() -> Vec<Module> {
    (1..=4u8)
        .map(|n| Module::new(n, vec![question(&format!("m{}", n))]))
        .collect()
}

fn events_of(events: &[UploadProgress], stage: UploadStage) -> Vec<(usize, usize)> {
    events
        .iter()
        .filter(|e| e.stage == stage)
        .map(|e| (e.current, e.total))
        .collect()
}

#[tokio::test]
async fn two_module_upload_links_questions_in_global_order() {
    let store = MemoryStore::with_test_sections();
    let flow = UploadFlow::new(&store);
    let events = RefCell::new(Vec::new());
    let sink = |p: &UploadProgress| events.borrow_mut().push(p.clone());

    let outcome = flow
        .upload_bulk_data(
            &two_modules(),
            "Practice Test 1",
            Some("October"),
            Some(&sink as &dyn ProgressSink),
        )
        .await
        .unwrap();

    assert_eq!(outcome.total_questions, 3);
    assert_eq!(outcome.test_id, "tests-1");

    let events = events.into_inner();
    assert_eq!(
        events_of(&events, UploadStage::Questions),
        [(1, 3), (2, 3), (3, 3)]
    );
    assert_eq!(events_of(&events, UploadStage::Test), [(1, 1)]);
    assert_eq!(
        events_of(&events, UploadStage::TestQuestions),
        [(1, 3), (2, 3), (3, 3)]
    );
    let last = events.last().unwrap();
    assert_eq!((last.stage, last.current, last.total), (UploadStage::Complete, 3, 3));

    let tests = store.records(Collection::Tests);
    assert_eq!(tests.len(), 1);
    assert_eq!(tests[0]["title"], json!("Practice Test 1"));
    assert_eq!(tests[0]["description"], json!("October"));
    assert_eq!(tests[0]["is_full_test"], json!(false));

    let links = store.records(Collection::TestQuestions);
    let summary: Vec<(String, String, u64)> = links
        .iter()
        .map(|link| {
            assert_eq!(link["test_id"], json!("tests-1"));
            (
                link["question_id"].as_str().unwrap().to_string(),
                link["test_section_id"].as_str().unwrap().to_string(),
                link["order_in_test"].as_u64().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        summary,
        [
            ("questions-1".to_string(), "TESTSECTION1".to_string(), 1),
            ("questions-2".to_string(), "TESTSECTION1".to_string(), 2),
            ("questions-3".to_string(), "TESTSECTION2".to_string(), 3),
        ]
    );

    // 第 1、2 模块不会触发章节标记
    assert!(store.calls().iter().all(|call| call.op == StoreOp::Insert));
}

#[tokio::test]
async fn writes_happen_phase_by_phase() {
    let store = MemoryStore::with_test_sections();
    let flow = UploadFlow::new(&store);

    assert_ok!(flow.upload_bulk_data(&four_modules(), "Full", None, None).await);

    let collections: Vec<Collection> = store.calls().iter().map(|c| c.collection).collect();
    assert_eq!(
        collections,
        [
            Collection::Questions,
            Collection::Questions,
            Collection::Questions,
            Collection::Questions,
            Collection::Tests,
            Collection::TestSections,
            Collection::TestSections,
            Collection::TestQuestions,
            Collection::TestQuestions,
            Collection::TestQuestions,
            Collection::TestQuestions,
        ]
    );
}

#[tokio::test]
async fn four_modules_make_a_full_test_and_flag_math_sections() {
    let store = MemoryStore::with_test_sections();
    let flow = UploadFlow::new(&store);

    let outcome = flow
        .upload_bulk_data(&four_modules(), "Full", None, None)
        .await
        .unwrap();
    assert_eq!(outcome.total_questions, 4);

    let test = store.find(Collection::Tests, &outcome.test_id).unwrap();
    assert_eq!(test["is_full_test"], json!(true));
    assert!(test.get("description").is_none());

    for (section, is_math) in [
        ("TESTSECTION1", false),
        ("TESTSECTION2", false),
        ("TESTSECTION3", true),
        ("TESTSECTION4", true),
    ] {
        let record = store.find(Collection::TestSections, section).unwrap();
        assert_eq!(record["is_math_section"], json!(is_math), "{}", section);
        assert_eq!(record["is_desmos_allowed"], json!(is_math), "{}", section);
    }

    let updates = store
        .calls()
        .into_iter()
        .filter(|call| call.op == StoreOp::Update)
        .count();
    assert_eq!(updates, 2);
}

#[tokio::test]
async fn module_three_alone_still_flags_its_section() {
    let store = MemoryStore::with_test_sections();
    let flow = UploadFlow::new(&store);
    let modules = vec![Module::new(3, vec![question("math-1")])];

    let outcome = flow.upload_bulk_data(&modules, "Math only", None, None).await.unwrap();

    let test = store.find(Collection::Tests, &outcome.test_id).unwrap();
    assert_eq!(test["is_full_test"], json!(false));
    let section = store.find(Collection::TestSections, "TESTSECTION3").unwrap();
    assert_eq!(section["is_math_section"], json!(true));

    let link = &store.records(Collection::TestQuestions)[0];
    assert_eq!(link["test_section_id"], json!("TESTSECTION3"));
    assert_eq!(link["order_in_test"], json!(1));
}

#[tokio::test]
async fn section_update_failure_does_not_abort() {
    let store = MemoryStore::with_test_sections();
    store.fail_updates(Collection::TestSections);
    let flow = UploadFlow::new(&store);

    let outcome = flow
        .upload_bulk_data(&four_modules(), "Full", None, None)
        .await
        .unwrap();

    assert_eq!(outcome.total_questions, 4);
    assert_eq!(store.records(Collection::TestQuestions).len(), 4);
}

#[tokio::test]
async fn second_question_failure_aborts_before_test_and_links() {
    let store = MemoryStore::with_test_sections();
    store.fail_insert(Collection::Questions, 2);
    let flow = UploadFlow::new(&store);

    let err = assert_err!(flow.upload_bulk_data(&two_modules(), "Broken", None, None).await);

    match &err {
        UploadError::QuestionInsertFailed { position, total, .. } => {
            assert_eq!(*position, 2);
            assert_eq!(*total, 3);
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(err.stage(), Some("questions"));
    assert_eq!(err.position(), Some(2));
    assert!(err.to_string().contains("第 2/3 道题目"));

    assert_eq!(
        store.calls(),
        [
            StoreCall {
                op: StoreOp::Insert,
                collection: Collection::Questions
            },
            StoreCall {
                op: StoreOp::Insert,
                collection: Collection::Questions
            },
        ]
    );
    assert!(store.records(Collection::Tests).is_empty());
    assert!(store.records(Collection::TestQuestions).is_empty());
}

#[tokio::test]
async fn test_insert_failure_reports_orphaned_questions() {
    let store = MemoryStore::with_test_sections();
    store.fail_insert(Collection::Tests, 1);
    let flow = UploadFlow::new(&store);

    let err = flow
        .upload_bulk_data(&two_modules(), "Broken", None, None)
        .await
        .unwrap_err();

    match err {
        UploadError::TestInsertFailed {
            orphaned_question_ids,
            ..
        } => assert_eq!(
            orphaned_question_ids,
            ["questions-1", "questions-2", "questions-3"]
        ),
        other => panic!("unexpected error: {:?}", other),
    }
    // 已写入的题目不会被删除
    assert_eq!(store.records(Collection::Questions).len(), 3);
    assert!(store.records(Collection::TestQuestions).is_empty());
}

#[tokio::test]
async fn link_failure_reports_position_and_test_id() {
    let store = MemoryStore::with_test_sections();
    store.fail_insert(Collection::TestQuestions, 2);
    let flow = UploadFlow::new(&store);
    let events = RefCell::new(Vec::new());
    let sink = |p: &UploadProgress| events.borrow_mut().push(p.stage);

    let err = flow
        .upload_bulk_data(&two_modules(), "Broken", None, Some(&sink as &dyn ProgressSink))
        .await
        .unwrap_err();

    match &err {
        UploadError::LinkInsertFailed {
            position, test_id, ..
        } => {
            assert_eq!(*position, 2);
            assert_eq!(test_id, "tests-1");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(err.stage(), Some("test_questions"));
    assert_eq!(store.records(Collection::TestQuestions).len(), 1);
    assert!(!events.into_inner().contains(&UploadStage::Complete));
}

#[tokio::test]
async fn modules_are_visited_in_module_number_order() {
    let store = MemoryStore::new();
    let flow = UploadFlow::new(&store);
    let modules = vec![
        Module::new(2, vec![question("second")]),
        Module::new(1, vec![question("first-a"), question("first-b")]),
    ];

    flow.upload_bulk_data(&modules, "Reordered", None, None)
        .await
        .unwrap();

    let refs: Vec<String> = store
        .records(Collection::Questions)
        .iter()
        .map(|q| q["reference_id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(refs, ["first-a", "first-b", "second"]);

    let sections: Vec<String> = store
        .records(Collection::TestQuestions)
        .iter()
        .map(|l| l["test_section_id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(sections, ["TESTSECTION1", "TESTSECTION1", "TESTSECTION2"]);
}

#[tokio::test]
async fn persisted_question_shape_uses_snake_case_fields() {
    let store = MemoryStore::new();
    let flow = UploadFlow::new(&store);
    let mut numeric = question("grid-in");
    numeric.question_type = QuestionType::Numeric;
    numeric.answer_choices.clear();
    numeric.correct_answer = "3/4".to_string();

    flow.upload_bulk_data(&[Module::new(1, vec![numeric])], "Shape", None, None)
        .await
        .unwrap();

    let stored = &store.records(Collection::Questions)[0];
    assert_eq!(stored["question_type"], json!("numeric"));
    assert_eq!(stored["answer_choices"], json!([]));
    assert_eq!(stored["correct_answer"], json!("3/4"));
    assert_eq!(stored["reference_id"], json!("grid-in"));
}
