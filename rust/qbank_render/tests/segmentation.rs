use qbank_render::{parse_latex_document, render_markdown_with_latex, segment, Question};

#[test]
fn scenario_with_markers() {
    let seg = segment("解方程：2x+1=0\n答案：x=-0.5\n解析：移项可得");
    assert_eq!(seg.content, "解方程：2x+1=0");
    assert_eq!(seg.answer, "答案：x=-0.5");
    assert_eq!(seg.analysis, "解析：移项可得");
}

#[test]
fn scenario_without_markers() {
    let raw = "只是一段普通文字\n没有任何标记";
    let seg = segment(raw);
    assert_eq!(seg.content, raw);
    assert!(seg.answer.is_empty());
    assert!(seg.analysis.is_empty());
}

#[test]
fn knowledge_tags_are_deduplicated_in_order() {
    let seg = segment("题目\n【知识点】一元二次方程、因式分解、一元二次方程");
    assert_eq!(seg.tags, vec!["一元二次方程", "因式分解"]);
}

#[test]
fn segmented_fields_feed_the_display_pipeline() {
    let seg = segment("求 \\(\\frac{1}{2}+\\frac{1}{2}\\)\n答案：$1$\n解析：通分");
    let mut q = Question::default();
    q.apply_segmented(seg);
    let content = render_markdown_with_latex(&q.content);
    let answer = render_markdown_with_latex(&q.answer);
    assert!(content.contains("<math"));
    assert!(answer.starts_with("答案："));
    assert!(answer.contains("<math"));
}

#[test]
fn pasted_latex_document_round_trip_to_html() {
    let parsed = parse_latex_document(
        "\\item 计算 $1+1$\n\\textbf{答案：} $2$\n\\textbf{解析：}\n\\[\n1+1=2\n\\]",
    );
    assert_eq!(parsed.content, "计算 $1+1$");
    assert_eq!(parsed.answer, "$2$");
    let html = render_markdown_with_latex(&parsed.analysis);
    assert!(html.contains("math-display"));
}
