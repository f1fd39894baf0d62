use std::sync::Arc;

use weft_reflect::Schema;
use weft_store::InMemoryDataStore;
use weft_transform::{
    Call, Collaborators, Context, Dependencies, MapperConfig, Transformer, TransformerRegistry,
};
use weft_types::{Object, Value};

pub const SCHEMA: &str = r#"
    [[types]]
    name = "Invoice"
    properties = [
        { name = "paid", type = "bool" },
        { name = "total", type = "number", precision = { minimum = 2, maximum = 2 } },
        { name = "amount", type = "number" },
        { name = "reference", type = "bigint" },
        { name = "due", type = "date" },
        { name = "note", type = "text" },
    ]
"#;

pub fn collaborators(deps: Dependencies) -> Collaborators {
    Collaborators::new(
        deps,
        MapperConfig::default(),
        Arc::new(Schema::from_toml_str(SCHEMA).unwrap()),
        Arc::new(InMemoryDataStore::new()),
    )
}

/// Invoke `transformer` on `Invoice.property` without context and return
/// the applied value.
pub async fn run(transformer: &dyn Transformer, value: Value, property: &str) -> Value {
    let registry = TransformerRegistry::new();
    let mut owner = Object::new("Invoice");
    let call = Call {
        owner: &mut owner,
        property,
        context: Context::None,
        registry: &registry,
    };
    transformer
        .transform(value, call)
        .await
        .unwrap()
        .into_value()
        .expect("transformer should apply a value")
}
