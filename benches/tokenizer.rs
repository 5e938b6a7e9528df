use std::sync::Arc;

use criterion::{Criterion, criterion_group, criterion_main};
use fsmlex::{Grammar, Input, Tokenizer};

fn words_grammar() -> Arc<Grammar> {
    let mut builder = Grammar::builder();
    builder
        .define_token_type("Word", r"[a-zA-Z]+")
        .unwrap()
        .define_token_type("Number", r"[0-9]+")
        .unwrap()
        .define_token_type("Sep", r"[ \t\n]+")
        .unwrap()
        .define_token_type("Punct", r"[.,;:-]")
        .unwrap()
        .define_error_type("SyntaxError", r"[^ \t\n]+", "syntax error")
        .unwrap();
    Arc::new(builder.build())
}

fn criterion_benchmark(c: &mut Criterion) {
    let input = "Lorem ipsum dolor sit amet, consectetur adipiscing elit. \
                 Sed aliquet odio quis elit aliquet eu interdum 42 justo adipiscing. \
                 Vestibulum sodales ornare adipiscing.\n"
        .repeat(50);
    let grammar = words_grammar();

    c.bench_function("word tokenization", |b| {
        b.iter(|| {
            let mut tokenizer = Tokenizer::chars(grammar.clone());
            tokenizer.bind(Input::text(input.clone()));
            let tokens: Result<Vec<_>, _> = tokenizer.tokens().collect();
            std::hint::black_box(tokens.expect("tokenization should succeed"));
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
