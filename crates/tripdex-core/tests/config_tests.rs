use tripdex_core::config::Settings;
use tripdex_core::Error;

#[test]
fn defaults_are_usable_without_any_config_file() {
    let settings = Settings::default();
    assert_eq!(settings.search.rrf_k, 60);
    assert_eq!(settings.search.default_limit, 10);
    assert_eq!(settings.llm.embed_dim, 1536);
    assert!(!settings.llm.has_api_key());
}

#[test]
fn env_overrides_reach_nested_sections() {
    figment::Jail::expect_with(|jail| {
        jail.set_env("TRIPDEX_SEARCH__RRF_K", "90");
        jail.set_env("TRIPDEX_LLM__API_KEY", "sk-test");
        let settings = Settings::load_for_env("test").expect("load settings");
        assert_eq!(settings.search.rrf_k, 90);
        assert!(settings.llm.has_api_key());
        Ok(())
    });
}

#[test]
fn zero_rrf_k_is_rejected() {
    figment::Jail::expect_with(|jail| {
        jail.set_env("TRIPDEX_SEARCH__RRF_K", "0");
        let err = Settings::load_for_env("test").expect_err("must reject");
        assert!(matches!(err, Error::InvalidConfig(_)));
        Ok(())
    });
}
