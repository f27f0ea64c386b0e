//! Property tests for the policy filter and retrieval orchestrator

use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;
use std::sync::Arc;

use scoperag::{
    Attributes, Document, DocumentIndex, Embedding, PolicyFilter, RequesterContext,
    RetrievalOrchestrator,
};

const USERS: &[&str] = &["123", "456", "789"];
const LOCATIONS: &[&str] = &["New York", "London"];
const DEPARTMENTS: &[&str] = &["IT", "Dev", "HR"];
const TIERS: &[&str] = &["public", "internal", "confidential", "top-secret"];

fn pick(g: &mut Gen, values: &[&str]) -> String {
    g.choose(values).copied().unwrap_or_default().to_string()
}

/// Document attributes drawn from a small vocabulary so matches are common
#[derive(Debug, Clone)]
struct DocAttrs(Attributes);

impl Arbitrary for DocAttrs {
    fn arbitrary(g: &mut Gen) -> Self {
        let mut attrs = Attributes::new();
        if bool::arbitrary(g) {
            attrs.insert("user_id".to_string(), pick(g, USERS));
        }
        if bool::arbitrary(g) {
            attrs.insert("location".to_string(), pick(g, LOCATIONS));
        }
        if bool::arbitrary(g) {
            attrs.insert("department".to_string(), pick(g, DEPARTMENTS));
        }
        if bool::arbitrary(g) {
            attrs.insert("sensitivity".to_string(), pick(g, TIERS));
        }
        if bool::arbitrary(g) {
            attrs.insert("type".to_string(), "public".to_string());
        }
        DocAttrs(attrs)
    }
}

/// Requester claims drawn from the same vocabulary
#[derive(Debug, Clone)]
struct Claims(RequesterContext);

impl Arbitrary for Claims {
    fn arbitrary(g: &mut Gen) -> Self {
        let mut context = RequesterContext::new();
        if bool::arbitrary(g) {
            context.insert("user_id", pick(g, USERS));
        }
        if bool::arbitrary(g) {
            context.insert("location", pick(g, LOCATIONS));
        }
        if bool::arbitrary(g) {
            context.insert("department", pick(g, DEPARTMENTS));
        }
        Claims(context)
    }
}

/// A deny-capable attribute that may be added to a document
#[derive(Debug, Clone)]
struct Restriction(String, String);

impl Arbitrary for Restriction {
    fn arbitrary(g: &mut Gen) -> Self {
        match u8::arbitrary(g) % 3 {
            0 => Restriction("user_id".to_string(), pick(g, USERS)),
            1 => Restriction("location".to_string(), pick(g, LOCATIONS)),
            _ => Restriction("sensitivity".to_string(), pick(g, TIERS)),
        }
    }
}

fn orchestrator_for(corpus: &[DocAttrs]) -> RetrievalOrchestrator {
    let index = Arc::new(DocumentIndex::new());
    for (i, attrs) in corpus.iter().enumerate() {
        index.put(
            Document::new(format!("doc-{:03}", i), format!("content {}", i))
                .with_attributes(attrs.0.clone()),
            Embedding::new(vec![i as f64, 0.0]),
        );
    }
    index.mark_loaded();
    RetrievalOrchestrator::new(index, Arc::new(PolicyFilter::standard()))
}

#[quickcheck]
fn prop_denied_documents_never_returned(corpus: Vec<DocAttrs>, claims: Claims) -> bool {
    let orchestrator = orchestrator_for(&corpus);
    let filter = PolicyFilter::standard();
    let admitted = orchestrator.retrieve("q", &claims.0).unwrap();

    let admitted_ids: Vec<_> = admitted.iter().map(|d| d.id.clone()).collect();
    corpus.iter().enumerate().all(|(i, attrs)| {
        let id = format!("doc-{:03}", i);
        let denied = filter.evaluate(&attrs.0, &claims.0).denied_by.is_some();
        denied != admitted_ids.contains(&id)
    })
}

#[quickcheck]
fn prop_retrieve_is_idempotent(corpus: Vec<DocAttrs>, claims: Claims) -> bool {
    let orchestrator = orchestrator_for(&corpus);
    let first = orchestrator.retrieve("q", &claims.0).unwrap();
    let second = orchestrator.retrieve("q", &claims.0).unwrap();
    first == second
}

#[quickcheck]
fn prop_results_in_enumeration_order(corpus: Vec<DocAttrs>, claims: Claims) -> bool {
    let orchestrator = orchestrator_for(&corpus);
    let ids: Vec<_> = orchestrator
        .retrieve("q", &claims.0)
        .unwrap()
        .into_iter()
        .map(|d| d.id)
        .collect();
    ids.windows(2).all(|pair| pair[0] < pair[1])
}

#[quickcheck]
fn prop_adding_restriction_never_admits_more(
    attrs: DocAttrs,
    restriction: Restriction,
    claims: Claims,
) -> bool {
    let Restriction(key, value) = restriction;
    if attrs.0.contains_key(&key) {
        return true;
    }

    let filter = PolicyFilter::standard();
    let mut restricted = attrs.0.clone();
    restricted.insert(key, value);

    // restricted admitted implies original admitted
    !filter.admits(&restricted, &claims.0) || filter.admits(&attrs.0, &claims.0)
}

#[quickcheck]
fn prop_unrestricted_documents_always_admitted(department: Option<u8>, claims: Claims) -> bool {
    let mut attrs = Attributes::new();
    attrs.insert("type".to_string(), "public".to_string());
    if let Some(n) = department {
        attrs.insert(
            "department".to_string(),
            DEPARTMENTS[n as usize % DEPARTMENTS.len()].to_string(),
        );
    }
    PolicyFilter::standard().admits(&attrs, &claims.0)
}

#[quickcheck]
fn prop_admits_agrees_with_evaluate(attrs: DocAttrs, claims: Claims) -> bool {
    let filter = PolicyFilter::standard();
    filter.admits(&attrs.0, &claims.0) == filter.evaluate(&attrs.0, &claims.0).is_admitted()
}

#[quickcheck]
fn prop_empty_filter_admits_everything(attrs: DocAttrs, claims: Claims) -> bool {
    PolicyFilter::new().admits(&attrs.0, &claims.0)
}
