use figurag_core::config::{ProviderKind, ProviderSettings};
use figurag_provider::{build_providers_with_key, cosine_similarity, is_usable_key, HashEmbedder};
use figurag_core::traits::Embedder;

fn settings(kind: ProviderKind) -> ProviderSettings {
    ProviderSettings { kind, ..ProviderSettings::default() }
}

#[test]
fn placeholder_keys_are_not_usable() {
    assert!(!is_usable_key(""));
    assert!(!is_usable_key("  "));
    assert!(!is_usable_key("your-openai-api-key-here"));
    assert!(!is_usable_key("demo-key-for-testing"));
    assert!(is_usable_key("sk-abc123"));
}

#[test]
fn missing_key_degrades_to_no_completer() {
    let providers = build_providers_with_key(&settings(ProviderKind::OpenAi), None);
    assert!(providers.completer.is_none());
    let providers = build_providers_with_key(&settings(ProviderKind::ZhipuAi), Some("demo-key-for-testing".into()));
    assert!(providers.completer.is_none());
}

#[test]
fn real_key_builds_client_without_network() {
    let mut s = settings(ProviderKind::ZhipuAi);
    s.use_embeddings = true;
    let providers = build_providers_with_key(&s, Some("abc.def".into()));
    assert_eq!(providers.completer.as_ref().map(|c| c.model().to_string()), Some("glm-4-flash".into()));
    let embedder = providers.embedder.expect("embedder");
    assert_eq!(embedder.id(), "remote:embedding-2");
    assert_eq!(embedder.dim(), 1024);
}

#[test]
fn fake_kind_provides_hash_embeddings() {
    let providers = build_providers_with_key(&settings(ProviderKind::Fake), None);
    assert!(providers.completer.is_none());
    let embedder = providers.embedder.expect("embedder");
    let v = embedder.embed("生存曲线").unwrap();
    assert_eq!(v.len(), embedder.dim());
}

#[test]
fn shared_tokens_raise_similarity() {
    let e = HashEmbedder::new(256);
    let q = e.embed_one("生存曲线 Kaplan-Meier");
    let near = e.embed_one("Kaplan-Meier 生存曲线 分析");
    let far = e.embed_one("UMAP 降维");
    assert!(cosine_similarity(&q, &near) > cosine_similarity(&q, &far));
}
