//! GL-008: Relationship mutations.
//!
//! Symmetric fields are always written on both endpoints. Deletion is the
//! only operation that scans the whole store, and it lives here, away from
//! the read path.

use super::error::{GlossError, Result};
use super::slug::{derive_slug, parse_reference};
use super::store::GlossStore;
use super::types::{Gloss, LogMarker, RelationField};
use chrono::Utc;
use tracing::info;

/// Outcome of deleting a gloss and scrubbing references to it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteReport {
    pub reference: String,
    /// Individual references removed across all glosses.
    pub refs_removed: usize,
    /// Glosses rewritten because they referenced the deleted one.
    pub glosses_updated: usize,
}

fn require<S: GlossStore + ?Sized>(store: &S, reference: &str) -> Result<Gloss> {
    if parse_reference(reference).is_none() {
        return Err(GlossError::InvalidReference(reference.to_string()));
    }
    store
        .resolve_reference(reference)
        .ok_or_else(|| GlossError::NotFound(reference.to_string()))
}

fn push_unique(list: &mut Vec<String>, value: &str) -> bool {
    if list.iter().any(|v| v == value) {
        false
    } else {
        list.push(value.to_string());
        true
    }
}

fn remove_all(list: &mut Vec<String>, value: &str) -> usize {
    let before = list.len();
    list.retain(|v| v != value);
    before - list.len()
}

/// Remove every entry that parses to the same reference as `reference`,
/// whatever its spelling on disk.
fn remove_resolving_to(list: &mut Vec<String>, reference: &str) -> usize {
    let Some(wanted) = parse_reference(reference) else {
        return remove_all(list, reference);
    };
    let before = list.len();
    list.retain(|v| parse_reference(v).as_ref() != Some(&wanted));
    before - list.len()
}

/// Add `target_ref` to `field` of the base gloss, and the reverse edge for
/// symmetric fields. Tags are plain strings and need not resolve.
/// Returns whether anything changed.
pub fn attach_relation<S: GlossStore + ?Sized>(
    store: &mut S,
    base_ref: &str,
    field: RelationField,
    target_ref: &str,
) -> Result<bool> {
    let mut base = require(store, base_ref)?;
    if field == RelationField::Tags {
        let changed = push_unique(&mut base.tags, target_ref);
        if changed {
            store.save_gloss(&base)?;
        }
        return Ok(changed);
    }

    let mut target = require(store, target_ref)?;
    let base_key = base.reference();
    let target_key = target.reference();
    let mut changed = push_unique(base.refs_mut(field), &target_key);
    if changed {
        store.save_gloss(&base)?;
    }
    if field.is_symmetric() && base_key != target_key && push_unique(target.refs_mut(field), &base_key) {
        store.save_gloss(&target)?;
        changed = true;
    }
    if changed {
        info!(base = %base_key, %field, target = %target_key, "attached relation");
    }
    Ok(changed)
}

/// Remove `target_ref` from `field` of the base gloss, and the reverse edge
/// for symmetric fields when the target still exists.
pub fn detach_relation<S: GlossStore + ?Sized>(
    store: &mut S,
    base_ref: &str,
    field: RelationField,
    target_ref: &str,
) -> Result<bool> {
    let mut base = require(store, base_ref)?;
    let base_key = base.reference();
    let mut changed = remove_all(base.refs_mut(field), target_ref) > 0;
    if changed {
        store.save_gloss(&base)?;
    }
    if field.is_symmetric() && base_key != target_ref {
        if let Some(mut target) = store.resolve_reference(target_ref) {
            if remove_resolving_to(target.refs_mut(field), &base_key) > 0 {
                store.save_gloss(&target)?;
                changed = true;
            }
        }
    }
    if changed {
        info!(base = %base_key, %field, target = target_ref, "detached relation");
    }
    Ok(changed)
}

/// Find a gloss by the slug its content derives to, or create it.
pub fn ensure_gloss<S: GlossStore + ?Sized>(store: &mut S, language: &str, content: &str) -> Result<Gloss> {
    let slug = derive_slug(content).ok_or_else(|| GlossError::EmptySlug(content.to_string()))?;
    if let Some(existing) = store.load_gloss(language, &slug)? {
        return Ok(existing);
    }
    store.create_gloss(Gloss::new(language, content))
}

/// Ensure a translation gloss, link it symmetrically to the source, and
/// attach an optional one-way note to the translation.
pub fn attach_translation_with_note<S: GlossStore + ?Sized>(
    store: &mut S,
    source_ref: &str,
    translation_text: &str,
    translation_language: &str,
    note: Option<(&str, &str)>,
) -> Result<Gloss> {
    require(store, source_ref)?;
    let translation = ensure_gloss(store, translation_language, translation_text)?;
    attach_relation(store, source_ref, RelationField::Translations, &translation.reference())?;

    if let Some((note_text, note_language)) = note {
        let note_text = note_text.trim();
        if !note_text.is_empty() {
            let note_gloss = ensure_gloss(store, note_language, note_text)?;
            attach_relation(
                store,
                &translation.reference(),
                RelationField::Notes,
                &note_gloss.reference(),
            )?;
        }
    }
    require(store, &translation.reference())
}

/// Delete a gloss and remove every reference to it from every other gloss.
///
/// This is a full store scan by necessity.
pub fn delete_gloss_with_cleanup<S: GlossStore + ?Sized>(store: &mut S, reference: &str) -> Result<DeleteReport> {
    let gloss = require(store, reference)?;
    let key = gloss.reference();
    store.remove_gloss(&gloss.language, &gloss.slug)?;

    let mut report = DeleteReport {
        reference: key.clone(),
        ..DeleteReport::default()
    };
    let mut updated = Vec::new();
    for mut item in store.glosses() {
        let removed: usize = RelationField::ALL
            .into_iter()
            .filter(|f| *f != RelationField::Tags)
            .map(|f| remove_resolving_to(item.refs_mut(f), &key))
            .sum();
        if removed > 0 {
            report.refs_removed += removed;
            updated.push(item);
        }
    }
    for item in &updated {
        store.save_gloss(item)?;
    }
    report.glosses_updated = updated.len();
    info!(
        reference = %key,
        refs_removed = report.refs_removed,
        glosses_updated = report.glosses_updated,
        "deleted gloss"
    );
    Ok(report)
}

fn set_flag<S: GlossStore + ?Sized>(
    store: &mut S,
    reference: &str,
    apply: impl FnOnce(&mut Gloss),
) -> Result<Gloss> {
    let mut gloss = require(store, reference)?;
    apply(&mut gloss);
    store.save_gloss(&gloss)?;
    Ok(gloss)
}

pub fn set_needs_human_check<S: GlossStore + ?Sized>(store: &mut S, reference: &str, value: bool) -> Result<Gloss> {
    set_flag(store, reference, |g| g.needs_human_check = value)
}

pub fn set_exclude_from_learning<S: GlossStore + ?Sized>(store: &mut S, reference: &str, value: bool) -> Result<Gloss> {
    set_flag(store, reference, |g| g.exclude_from_learning = value)
}

/// Record a marker in the gloss's logs under a UTC timestamp key.
/// Returns the key used.
pub fn mark_gloss_log<S: GlossStore + ?Sized>(store: &mut S, reference: &str, marker: &LogMarker) -> Result<String> {
    let mut gloss = require(store, reference)?;
    let mut key = Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string();
    while gloss.logs.contains_key(&key) {
        key.push('+');
    }
    gloss.logs.insert(key.clone(), marker.clone().into());
    store.save_gloss(&gloss)?;
    info!(reference = %gloss.reference(), %marker, "marked gloss");
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::{FsStore, MemoryStore};

    fn add(store: &mut impl GlossStore, lang: &str, content: &str) -> String {
        store.create_gloss(Gloss::new(lang, content)).unwrap().reference()
    }

    fn get(store: &impl GlossStore, reference: &str) -> Gloss {
        store.resolve_reference(reference).unwrap()
    }

    #[test]
    fn test_gl008_translation_attach_is_symmetric() {
        let mut store = MemoryStore::new();
        let a = add(&mut store, "eng", "hello");
        let b = add(&mut store, "deu", "hallo");
        assert!(attach_relation(&mut store, &a, RelationField::Translations, &b).unwrap());
        assert_eq!(get(&store, &a).translations, vec![b.clone()]);
        assert_eq!(get(&store, &b).translations, vec![a.clone()]);
        // idempotent
        assert!(!attach_relation(&mut store, &a, RelationField::Translations, &b).unwrap());
        assert_eq!(get(&store, &b).translations.len(), 1);
    }

    #[test]
    fn test_gl008_detach_removes_both_sides() {
        let mut store = MemoryStore::new();
        let a = add(&mut store, "eng", "hello");
        let b = add(&mut store, "deu", "hallo");
        attach_relation(&mut store, &a, RelationField::Translations, &b).unwrap();
        assert!(detach_relation(&mut store, &b, RelationField::Translations, &a).unwrap());
        assert!(get(&store, &a).translations.is_empty());
        assert!(get(&store, &b).translations.is_empty());
    }

    #[test]
    fn test_gl008_directional_fields_are_one_way() {
        let mut store = MemoryStore::new();
        let a = add(&mut store, "deu", "Guten Tag");
        let b = add(&mut store, "deu", "Tag");
        attach_relation(&mut store, &a, RelationField::Parts, &b).unwrap();
        assert_eq!(get(&store, &a).parts, vec![b.clone()]);
        assert!(get(&store, &b).parts.is_empty());
    }

    #[test]
    fn test_gl008_every_symmetric_field() {
        for field in RelationField::ALL.into_iter().filter(|f| f.is_symmetric()) {
            let mut store = MemoryStore::new();
            let a = add(&mut store, "eng", "one");
            let b = add(&mut store, "eng", "two");
            attach_relation(&mut store, &a, field, &b).unwrap();
            assert_eq!(get(&store, &b).refs(field), &vec![a.clone()], "{}", field);
            detach_relation(&mut store, &a, field, &b).unwrap();
            assert!(get(&store, &b).refs(field).is_empty(), "{}", field);
        }
    }

    #[test]
    fn test_gl008_attach_requires_existing_target() {
        let mut store = MemoryStore::new();
        let a = add(&mut store, "eng", "hello");
        let err = attach_relation(&mut store, &a, RelationField::Parts, "eng:missing").unwrap_err();
        assert!(matches!(err, GlossError::NotFound(_)));
        let err = attach_relation(&mut store, "bogus", RelationField::Parts, &a).unwrap_err();
        assert!(matches!(err, GlossError::InvalidReference(_)));
    }

    #[test]
    fn test_gl008_tags_need_not_resolve() {
        let mut store = MemoryStore::new();
        let a = add(&mut store, "eng", "at the airport");
        attach_relation(&mut store, &a, RelationField::Tags, "eng:situation").unwrap();
        assert!(get(&store, &a).is_situation());
    }

    #[test]
    fn test_gl008_detach_dangling_target() {
        let mut store = MemoryStore::new();
        let a = add(&mut store, "eng", "hello");
        let mut g = get(&store, &a);
        g.translations.push("deu:gone".into());
        store.save_gloss(&g).unwrap();
        assert!(detach_relation(&mut store, &a, RelationField::Translations, "deu:gone").unwrap());
        assert!(get(&store, &a).translations.is_empty());
    }

    #[test]
    fn test_gl008_delete_removes_usage_references() {
        let mut store = MemoryStore::new();
        let ex = add(&mut store, "deu", "Der Tag ist lang");
        let p1 = add(&mut store, "deu", "Tag");
        let p2 = add(&mut store, "deu", "lang");
        attach_relation(&mut store, &p1, RelationField::UsageExamples, &ex).unwrap();
        attach_relation(&mut store, &p2, RelationField::UsageExamples, &ex).unwrap();

        let report = delete_gloss_with_cleanup(&mut store, &ex).unwrap();
        assert_eq!(report.refs_removed, 2);
        assert_eq!(report.glosses_updated, 2);
        assert!(store.resolve_reference(&ex).is_none());
        assert!(get(&store, &p1).usage_examples.is_empty());
        assert!(get(&store, &p2).usage_examples.is_empty());
    }

    #[test]
    fn test_gl008_delete_counts_every_field() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FsStore::init(dir.path()).unwrap();
        let x = add(&mut store, "eng", "x");
        let y = add(&mut store, "deu", "y");
        attach_relation(&mut store, &x, RelationField::Translations, &y).unwrap();
        attach_relation(&mut store, &y, RelationField::Parts, &x).unwrap();
        attach_relation(&mut store, &y, RelationField::Notes, &x).unwrap();

        let report = delete_gloss_with_cleanup(&mut store, &x).unwrap();
        assert_eq!(report.refs_removed, 3);
        assert_eq!(report.glosses_updated, 1);
        let y = get(&store, &y);
        assert!(y.translations.is_empty() && y.parts.is_empty() && y.notes.is_empty());
    }

    #[test]
    fn test_gl008_delete_removes_variant_spellings() {
        let mut store = MemoryStore::new();
        let ex = add(&mut store, "deu", "Tag");
        let other = add(&mut store, "eng", "day");
        let mut g = get(&store, &other);
        g.translations.push("DEU:Tag".into());
        g.parts.push(" deu: Tag".into());
        g.notes.push("deu:Tage".into());
        store.save_gloss(&g).unwrap();

        let report = delete_gloss_with_cleanup(&mut store, &ex).unwrap();
        assert_eq!(report.refs_removed, 2);
        let g = get(&store, &other);
        assert!(g.translations.is_empty());
        assert!(g.parts.is_empty());
        assert_eq!(g.notes, vec!["deu:Tage"]);
    }

    #[test]
    fn test_gl008_delete_missing() {
        let mut store = MemoryStore::new();
        let err = delete_gloss_with_cleanup(&mut store, "eng:nothing").unwrap_err();
        assert!(matches!(err, GlossError::NotFound(_)));
    }

    #[test]
    fn test_gl008_translation_with_note() {
        let mut store = MemoryStore::new();
        let src = add(&mut store, "eng", "express gratitude");
        let t = attach_translation_with_note(&mut store, &src, "Danke", "deu", Some(("informal", "eng"))).unwrap();
        assert_eq!(t.reference(), "deu:Danke");
        assert_eq!(t.translations, vec![src.clone()]);
        assert_eq!(t.notes, vec!["eng:informal"]);
        assert_eq!(get(&store, &src).translations, vec!["deu:Danke"]);
        assert!(get(&store, "eng:informal").notes.is_empty());

        // a second call reuses the existing gloss
        let again = attach_translation_with_note(&mut store, &src, "Danke", "deu", Some(("  ", "eng"))).unwrap();
        assert_eq!(again.translations.len(), 1);
    }

    #[test]
    fn test_gl008_flags() {
        let mut store = MemoryStore::new();
        let a = add(&mut store, "eng", "hello");
        assert!(set_needs_human_check(&mut store, &a, true).unwrap().needs_human_check);
        assert!(set_exclude_from_learning(&mut store, &a, true).unwrap().exclude_from_learning);
        assert!(get(&store, &a).is_flagged());
        set_needs_human_check(&mut store, &a, false).unwrap();
        set_exclude_from_learning(&mut store, &a, false).unwrap();
        assert!(!get(&store, &a).is_flagged());
    }

    #[test]
    fn test_gl008_mark_log() {
        let mut store = MemoryStore::new();
        let a = add(&mut store, "deu", "doch");
        let marker = LogMarker::TranslationImpossible("eng".into());
        let k1 = mark_gloss_log(&mut store, &a, &marker).unwrap();
        let k2 = mark_gloss_log(&mut store, &a, &LogMarker::SplitUnnecessary).unwrap();
        assert!(k1.ends_with('Z') || k1.ends_with('+'));
        assert_ne!(k1, k2);
        let g = get(&store, &a);
        assert!(g.has_marker(&marker));
        assert!(g.has_marker(&LogMarker::SplitUnnecessary));
        assert_eq!(g.logs[&k1].text, "TRANSLATION_CONSIDERED_IMPOSSIBLE:eng");
    }

    #[test]
    fn test_gl008_ensure_gloss() {
        let mut store = MemoryStore::new();
        let first = ensure_gloss(&mut store, "eng", "hello.").unwrap();
        let second = ensure_gloss(&mut store, "eng", "hello").unwrap();
        assert_eq!(first.reference(), second.reference());
        assert_eq!(second.content, "hello.");
        assert!(ensure_gloss(&mut store, "eng", "::").is_err());
    }
}
