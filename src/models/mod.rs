// mod.rs - Substitution models module root

pub mod blosum;
pub mod identity;
pub mod kimura;
pub mod registry;
pub mod traits;

// Re-export main types for convenience
pub use blosum::Blosum62Model;
pub use identity::IdentityModel;
pub use kimura::KimuraModel;
pub use registry::ModelRegistry;
pub use traits::{ModelKind, SubstitutionModel};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry() {
        let registry = ModelRegistry::new();

        assert!(registry.has_model("identity"));
        assert!(registry.has_model("kimura"));
        assert!(registry.has_model("k2p"));
        assert!(registry.has_model("blosum62"));
        assert!(!registry.has_model("jukes-cantor"));

        let models = registry.list_models();
        assert_eq!(models.len(), 3);

        let names = registry.get_model_names();
        assert_eq!(names, vec!["blosum62", "identity", "kimura"]);
    }

    #[test]
    fn test_registry_lookup_by_kind() {
        let registry = ModelRegistry::new();
        for kind in ModelKind::all() {
            let model = registry.get(kind).unwrap();
            assert_eq!(model.kind(), kind);
        }
    }

    #[test]
    fn test_model_kind_parsing() {
        assert_eq!("identity".parse::<ModelKind>(), Ok(ModelKind::Identity));
        assert_eq!("TRANS".parse::<ModelKind>(), Ok(ModelKind::Kimura));
        assert_eq!("blosum".parse::<ModelKind>(), Ok(ModelKind::Blosum62));
        assert!("pam250".parse::<ModelKind>().is_err());
        assert_eq!(ModelKind::Kimura.to_string(), "kimura");
    }

    #[test]
    fn test_models_are_symmetric() {
        let registry = ModelRegistry::new();
        let pairs: [(&[u8], &[u8]); 3] = [
            (b"ACGTTGCA", b"ACGATGCT"),
            (b"AC-TTGCA", b"ACGATG-T"),
            (b"AAGTTGCA", b"GCGTTGCA"),
        ];
        for kind in ModelKind::all() {
            let model = registry.get(kind).unwrap();
            for (a, b) in pairs {
                let forward = model.distance(a, b).unwrap();
                let backward = model.distance(b, a).unwrap();
                assert!((forward - backward).abs() < 1e-12, "{} not symmetric", kind);
                assert!(forward >= 0.0);
            }
        }
    }
}
