use c2go_cc::lexer::lex;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_lexer(c: &mut Criterion) {
    let unit = r#"
// A representative translation unit.
typedef struct Node Node;

struct Node
{
	int value;
	Node *next;
};

static int
sum(Node *list)
{
	int total;

	total = 0;
	for(; list; list = list->next)
		total += list->value;
	return total;
}
"#;
    let source = unit.repeat(64);
    c.bench_function("lex_translation_unit", |b| {
        b.iter(|| lex("bench.c", black_box(&source)).expect("lex"))
    });
}

criterion_group!(benches, bench_lexer);
criterion_main!(benches);
