//! Integration tests for boolean queries across several fields

use pilum::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Doc {
    i: i64,
    s: String,
}

fn doc(i: i64, s: &str) -> Doc {
    Doc {
        i,
        s: s.to_string(),
    }
}

struct Fields {
    is_even: Field<Doc, bool>,
    prefix2: Field<Doc, String>,
    rune: Field<Doc, char>,
}

fn fields() -> Fields {
    Fields {
        is_even: Field::single("is_even", |doc: &Doc| doc.i % 2 == 0),
        prefix2: Field::single("prefix2", |doc: &Doc| doc.s.chars().take(2).collect()),
        rune: Field::new("rune", |doc: &Doc, emit: &mut dyn FnMut(char)| {
            for c in doc.s.chars() {
                emit(c);
            }
        }),
    }
}

fn hits(index: &InvertedIndex<Doc>, query: &Query<Doc>) -> Vec<Doc> {
    index.evaluate(query).cloned().collect()
}

#[test]
fn test_inverted_index_end_to_end() -> Result<()> {
    let f = fields();
    let mut index = InvertedIndex::builder()
        .config(IndexConfig::new("e2e"))
        .field(&f.is_even)
        .field(&f.prefix2)
        .field(&f.rune)
        .build()?;

    let (roo, bar, baz) = (doc(0, "roo"), doc(1, "bar"), doc(2, "baz"));
    assert!(index.add(roo.clone()));
    assert!(!index.add(roo.clone()));
    assert!(index.add(bar.clone()));
    assert!(index.add(baz.clone()));

    assert_eq!(hits(&index, &f.is_even.query(true)), vec![roo.clone(), baz.clone()]);
    assert_eq!(hits(&index, &f.prefix2.query("ba".into())), vec![bar.clone(), baz.clone()]);
    assert_eq!(hits(&index, &f.rune.query('r')), vec![roo.clone(), bar.clone()]);

    let roo_bar = Query::or([f.prefix2.query("ro".into()), f.is_even.query(false)]);
    assert_eq!(hits(&index, &roo_bar), vec![roo.clone(), bar.clone()]);
    assert_eq!(
        hits(&index, &Query::not(roo_bar.clone(), f.prefix2.query("ba".into()))),
        vec![roo.clone()]
    );

    let baz_query = Query::and([f.is_even.query(true), f.rune.query('z')]);
    assert_eq!(hits(&index, &baz_query), vec![baz.clone()]);
    assert!(hits(&index, &Query::not(baz_query.clone(), f.prefix2.query("ba".into()))).is_empty());

    assert!(index.remove(&roo));
    assert!(!index.remove(&roo));

    assert_eq!(hits(&index, &f.is_even.query(true)), vec![baz.clone()]);
    assert_eq!(hits(&index, &f.prefix2.query("ba".into())), vec![bar.clone(), baz.clone()]);
    assert_eq!(hits(&index, &f.rune.query('r')), vec![bar.clone()]);
    assert_eq!(hits(&index, &roo_bar), vec![bar.clone()]);
    assert!(hits(&index, &Query::not(roo_bar, f.prefix2.query("ba".into()))).is_empty());

    assert_eq!(hits(&index, &baz_query), vec![baz.clone()]);
    assert!(hits(&index, &Query::not(baz_query, f.prefix2.query("ba".into()))).is_empty());

    // Empty combinators match nothing, not everything.
    assert!(hits(&index, &Query::or(Vec::new())).is_empty());
    assert!(hits(&index, &Query::and(Vec::new())).is_empty());

    Ok(())
}

#[test]
fn test_unseen_values_and_fields() -> Result<()> {
    let f = fields();
    let mut index = InvertedIndex::builder().field(&f.rune).build()?;
    index.add_all([doc(0, "roo"), doc(1, "bar")]);

    assert!(hits(&index, &f.rune.query('q')).is_empty());
    // prefix2 was never registered on this index.
    assert!(hits(&index, &f.prefix2.query("ro".into())).is_empty());
    assert_eq!(
        hits(&index, &Query::or([f.prefix2.query("ro".into()), f.rune.query('b')])),
        vec![doc(1, "bar")]
    );
    let unregistered_and = Query::and([f.prefix2.query("ro".into()), f.rune.query('r')]);
    assert!(hits(&index, &unregistered_and).is_empty());

    Ok(())
}

#[test]
fn test_deep_query_tree() -> Result<()> {
    let f = fields();
    let mut index = InvertedIndex::builder()
        .field(&f.is_even)
        .field(&f.prefix2)
        .field(&f.rune)
        .build()?;
    index.add_all([
        doc(0, "roo"),
        doc(1, "bar"),
        doc(2, "baz"),
        doc(3, "rat"),
        doc(4, "zoo"),
        doc(5, "bat"),
    ]);

    // (has 'a' AND (starts "ra" OR starts "ba")) NOT (even AND has 'z')
    let query = Query::not(
        Query::and([
            f.rune.query('a'),
            Query::or([f.prefix2.query("ra".into()), f.prefix2.query("ba".into())]),
        ]),
        Query::and([f.is_even.query(true), f.rune.query('z')]),
    );
    assert_eq!(
        hits(&index, &query),
        vec![doc(1, "bar"), doc(3, "rat"), doc(5, "bat")]
    );
    assert_eq!(index.count(&query), 3);

    let mut first_two = Vec::new();
    for hit in index.evaluate(&query) {
        first_two.push(hit.s.clone());
        if first_two.len() == 2 {
            break;
        }
    }
    assert_eq!(first_two, vec!["bar".to_string(), "rat".to_string()]);

    Ok(())
}

#[test]
fn test_boolean_query_builder() -> Result<()> {
    let f = fields();
    let mut index = InvertedIndex::builder()
        .field(&f.is_even)
        .field(&f.rune)
        .build()?;
    index.add_all([doc(0, "roo"), doc(1, "bar"), doc(2, "baz")]);

    let query = BooleanQueryBuilder::new()
        .should(f.rune.query('r'))
        .should(f.rune.query('z'))
        .must_not(f.is_even.query(false))
        .build();
    assert_eq!(hits(&index, &query), vec![doc(0, "roo"), doc(2, "baz")]);

    Ok(())
}
