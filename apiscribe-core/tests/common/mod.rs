//! Shared models and serializers for engine tests.

#![allow(dead_code)]

use apiscribe_core::{
    Context, FieldBuilder, FieldValue, FromFieldValue, IntoFieldValue, ScribeResult,
    Serializable, Serializer, SharedContext, SideLoadedResourceBuilder, StoreId, ValueError,
};
use chrono::{DateTime, TimeZone, Utc};
use std::collections::BTreeMap;

/// Implements the model-binding half of `Serializer` for a struct with
/// `model` and `context` fields and a `Default` impl.
macro_rules! bind_model {
    ($model:ty) => {
        type Model = $model;

        fn from_model(model: $model, context: Option<SharedContext>) -> Self {
            Self {
                model,
                context,
                ..Default::default()
            }
        }

        fn model(&self) -> &$model {
            &self.model
        }

        fn model_mut(&mut self) -> &mut $model {
            &mut self.model
        }

        fn into_model(self) -> $model {
            self.model
        }

        fn context(&self) -> Option<&SharedContext> {
            self.context.as_ref()
        }

        fn set_context(&mut self, context: Option<SharedContext>) {
            self.context = context;
        }
    };
}

/// Installs a test subscriber once; `RUST_LOG=apiscribe_core=debug` shows traversal.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn fixed_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 19, 9, 30, 0).unwrap()
}

pub fn parse(bytes: &[u8]) -> serde_json::Value {
    serde_json::from_slice(bytes).unwrap()
}

pub fn bytes(value: serde_json::Value) -> Vec<u8> {
    serde_json::to_vec(&value).unwrap()
}

// ── Context ──────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PetContext {
    pub with_whiskers: bool,
    pub context_for_embedded_kid: bool,
}

impl Default for PetContext {
    fn default() -> Self {
        Self {
            with_whiskers: true,
            context_for_embedded_kid: true,
        }
    }
}

impl Context for PetContext {}

pub fn pet_context(with_whiskers: bool, context_for_embedded_kid: bool) -> SharedContext {
    SharedContext::new(PetContext {
        with_whiskers,
        context_for_embedded_kid,
    })
}

// ── Pet ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PetType {
    #[default]
    Unknown,
    Doggy,
    Kitty,
}

impl PetType {
    pub fn as_str(self) -> &'static str {
        match self {
            PetType::Unknown => "unknown",
            PetType::Doggy => "doggy",
            PetType::Kitty => "kitty",
        }
    }
}

impl IntoFieldValue for PetType {
    fn into_field_value(self) -> FieldValue {
        FieldValue::String(self.as_str().to_string())
    }
}

impl FromFieldValue for PetType {
    fn from_field_value(value: FieldValue) -> Result<Self, ValueError> {
        match value {
            FieldValue::String(s) => match s.as_str() {
                "unknown" => Ok(PetType::Unknown),
                "doggy" => Ok(PetType::Doggy),
                "kitty" => Ok(PetType::Kitty),
                _ => Err(ValueError::InvalidVariant {
                    target: "PetType",
                    value: s,
                }),
            },
            other => Err(ValueError::mismatch("string", &other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pet {
    pub id: Option<i64>,
    pub kind: PetType,
    pub name: String,
    pub age: i64,
    pub whiskers: bool,
    pub adopted_at: Option<DateTime<Utc>>,
}

impl Pet {
    pub fn new(id: i64, kind: PetType, name: &str, age: i64) -> Self {
        Self {
            id: Some(id),
            kind,
            name: name.to_string(),
            age,
            whiskers: true,
            adopted_at: None,
        }
    }

    pub fn adopted(mut self, at: DateTime<Utc>) -> Self {
        self.adopted_at = Some(at);
        self
    }

    pub fn lands_on_all_fours(&self) -> bool {
        self.kind == PetType::Kitty
    }
}

pub struct PetSerializer {
    pub model: Pet,
    pub context: Option<SharedContext>,
    pub should_decode_age: bool,
    pub include_whiskers: bool,
    pub writable_field: Vec<String>,
    pub kid: Option<Kid>,
    pub another_kid: Option<Kid>,
}

impl Default for PetSerializer {
    fn default() -> Self {
        Self {
            model: Pet::default(),
            context: None,
            should_decode_age: true,
            include_whiskers: true,
            writable_field: vec![String::new()],
            kid: None,
            another_kid: None,
        }
    }
}

impl Serializer for PetSerializer {
    bind_model!(Pet);

    const STORE_KEY: &'static str = "pet";

    fn store_id(&self) -> StoreId {
        StoreId::from(self.model.id.unwrap_or_default())
    }

    fn make_fields(&self, b: &mut FieldBuilder<Self>) -> ScribeResult<()> {
        b.field("id", self.model.id, |s, v| s.model.id = v)?;
        b.field("type", self.model.kind, |s, v| s.model.kind = v)?;
        b.field("name", self.model.name.clone(), |s, v| s.model.name = v)?;
        b.write_only("writableField", |s, v: Vec<String>| s.writable_field = v)?;
        b.read_only(
            "abilities",
            BTreeMap::from([(
                "landsOnAllFours".to_string(),
                self.model.lands_on_all_fours(),
            )]),
        )?;
        b.field("age", self.model.age, |s, v| s.model.age = v)?
            .encode_when(self.model.age > 10)
            .decode_when(self.should_decode_age);
        b.field("whiskers", self.model.whiskers, |s, v| s.model.whiskers = v)?
            .encode_when(self.include_whiskers)
            .decode_when(true);
        b.field("adoptedAt", self.model.adopted_at, |s, v| {
            s.model.adopted_at = v
        })?;
        b.embedded_resource("kid", self.kid.clone(), |s, kid| s.kid = kid)?;
        b.write_only_embedded_resource::<KidSerializer, _>("anotherKid", |s, kid| {
            s.another_kid = kid
        })?;
        Ok(())
    }
}

impl Serializable for Pet {
    type Serializer = PetSerializer;

    fn make_serializer(self, context: Option<SharedContext>) -> PetSerializer {
        let mut s = PetSerializer::from_model(self, context);
        if let Some(pet_context) = s.context.as_ref().and_then(|c| c.downcast_ref::<PetContext>()) {
            s.include_whiskers = pet_context.with_whiskers;
        }
        s
    }
}

// ── Kid ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Kid {
    pub id: Option<i64>,
    pub name: String,
    pub age: i64,
    pub hobbies: Vec<String>,
    pub nick_name: String,
}

impl Kid {
    pub fn new(id: i64, name: &str, age: i64, hobbies: &[&str]) -> Self {
        Self {
            id: Some(id),
            name: name.to_string(),
            age,
            hobbies: hobbies.iter().map(|h| h.to_string()).collect(),
            nick_name: String::new(),
        }
    }

    pub fn pets(&self) -> Vec<Pet> {
        vec![
            Pet::new(1, PetType::Doggy, "Kathleen", 11).adopted(fixed_date()),
            Pet::new(2, PetType::Kitty, "Miso", 43),
        ]
    }
}

#[derive(Default)]
pub struct KidSerializer {
    pub model: Kid,
    pub context: Option<SharedContext>,
}

impl KidSerializer {
    fn should_encode_hobbies(&self) -> bool {
        self.context
            .as_ref()
            .and_then(|c| c.downcast_ref::<PetContext>())
            .is_some_and(|c| c.context_for_embedded_kid)
    }
}

impl Serializer for KidSerializer {
    bind_model!(Kid);

    const STORE_KEY: &'static str = "kid";

    fn store_id(&self) -> StoreId {
        StoreId::from(self.model.id.unwrap_or_default())
    }

    fn make_fields(&self, b: &mut FieldBuilder<Self>) -> ScribeResult<()> {
        b.field("name", self.model.name.clone(), |s, v| s.model.name = v)?;
        b.read_only("age", self.model.age)?;
        b.read_only("hobbies", self.model.hobbies.clone())?
            .encode_when(self.should_encode_hobbies());
        b.write_only("nickName", |s, v: String| s.model.nick_name = v)?
            .decode_when(false);
        Ok(())
    }

    fn side_load_resources(&self, b: &mut SideLoadedResourceBuilder) -> ScribeResult<()> {
        b.add_all(self.model.pets());

        let toy = Toy {
            id: 2,
            name: "Truck".to_string(),
            fun_level: FunLevel::Extreme,
        };
        let mut toy_serializer = toy.make_serializer(None);
        toy_serializer.include_fun_level = true;
        b.add_serializer(toy_serializer);
        Ok(())
    }
}

impl Serializable for Kid {
    type Serializer = KidSerializer;
}

// ── Toy ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FunLevel {
    Extreme,
    #[default]
    NotBad,
    Meh,
}

impl IntoFieldValue for FunLevel {
    fn into_field_value(self) -> FieldValue {
        let name = match self {
            FunLevel::Extreme => "extreme",
            FunLevel::NotBad => "notBad",
            FunLevel::Meh => "meh",
        };
        FieldValue::String(name.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toy {
    pub id: i64,
    pub name: String,
    pub fun_level: FunLevel,
}

impl Default for Toy {
    fn default() -> Self {
        Self {
            id: -1,
            name: String::new(),
            fun_level: FunLevel::NotBad,
        }
    }
}

#[derive(Default)]
pub struct ToySerializer {
    pub model: Toy,
    pub context: Option<SharedContext>,
    pub include_fun_level: bool,
}

impl Serializer for ToySerializer {
    bind_model!(Toy);

    const STORE_KEY: &'static str = "toy";

    fn store_id(&self) -> StoreId {
        StoreId::from(self.model.id)
    }

    fn make_fields(&self, b: &mut FieldBuilder<Self>) -> ScribeResult<()> {
        b.field("name", self.model.name.clone(), |s, v| s.model.name = v)?;
        if self.include_fun_level {
            b.read_only("funLevel", self.model.fun_level)?;
        }
        Ok(())
    }
}

impl Serializable for Toy {
    type Serializer = ToySerializer;
}

// ── Fruit / Loop (mutual side loads) ─────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fruit {
    pub id: Option<i64>,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Loop {
    pub id: Option<i64>,
    pub name: String,
}

#[derive(Default)]
pub struct FruitSerializer {
    pub model: Fruit,
    pub context: Option<SharedContext>,
}

impl Serializer for FruitSerializer {
    bind_model!(Fruit);

    const STORE_KEY: &'static str = "fruit";

    fn store_id(&self) -> StoreId {
        StoreId::from(self.model.id.unwrap_or_default())
    }

    fn make_fields(&self, b: &mut FieldBuilder<Self>) -> ScribeResult<()> {
        b.field("name", self.model.name.clone(), |s, v| s.model.name = v)?;
        Ok(())
    }

    fn side_load_resources(&self, b: &mut SideLoadedResourceBuilder) -> ScribeResult<()> {
        b.add(Loop {
            id: Some(2),
            name: "Loopy".to_string(),
        });
        Ok(())
    }
}

impl Serializable for Fruit {
    type Serializer = FruitSerializer;
}

#[derive(Default)]
pub struct LoopSerializer {
    pub model: Loop,
    pub context: Option<SharedContext>,
}

impl Serializer for LoopSerializer {
    bind_model!(Loop);

    const STORE_KEY: &'static str = "loop";

    fn store_id(&self) -> StoreId {
        StoreId::from(self.model.id.unwrap_or_default())
    }

    fn make_fields(&self, b: &mut FieldBuilder<Self>) -> ScribeResult<()> {
        b.field("name", self.model.name.clone(), |s, v| s.model.name = v)?;
        Ok(())
    }

    fn side_load_resources(&self, b: &mut SideLoadedResourceBuilder) -> ScribeResult<()> {
        // Points back at the fruit that side-loaded this loop.
        b.add(Fruit {
            id: Some(2),
            name: "Apple".to_string(),
        });
        Ok(())
    }
}

impl Serializable for Loop {
    type Serializer = LoopSerializer;
}

// ── Thing (null handling) ────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Thing {
    pub optional_date: Option<DateTime<Utc>>,
    pub some_date: DateTime<Utc>,
    pub some_int: i64,
    pub some_string: String,
}

impl Default for Thing {
    fn default() -> Self {
        Self {
            optional_date: None,
            some_date: fixed_date(),
            some_int: 0,
            some_string: String::new(),
        }
    }
}

#[derive(Default)]
pub struct ThingSerializer {
    pub model: Thing,
    pub context: Option<SharedContext>,
}

impl Serializer for ThingSerializer {
    bind_model!(Thing);

    const STORE_KEY: &'static str = "thing";

    fn store_id(&self) -> StoreId {
        StoreId::from("1")
    }

    fn make_fields(&self, b: &mut FieldBuilder<Self>) -> ScribeResult<()> {
        b.field("optionaldate", self.model.optional_date, |s, v| {
            s.model.optional_date = v
        })?;
        b.field("somedate", self.model.some_date, |s, v| s.model.some_date = v)?;
        b.write_only("someint", |s, v: i64| s.model.some_int = v)?;
        b.field("somestring", self.model.some_string.clone(), |s, v| {
            s.model.some_string = v
        })?;
        Ok(())
    }
}

impl Serializable for Thing {
    type Serializer = ThingSerializer;
}

// ── Shelf / Tag (failing branch) ─────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tag {
    pub id: i64,
    pub label: String,
    pub bad_key: bool,
}

#[derive(Default)]
pub struct TagSerializer {
    pub model: Tag,
    pub context: Option<SharedContext>,
}

impl Serializer for TagSerializer {
    bind_model!(Tag);

    const STORE_KEY: &'static str = "tag";

    fn store_id(&self) -> StoreId {
        StoreId::from(self.model.id)
    }

    fn make_fields(&self, b: &mut FieldBuilder<Self>) -> ScribeResult<()> {
        let key = if self.model.bad_key { "  " } else { "label" };
        b.field(key, self.model.label.clone(), |s, v| s.model.label = v)?;
        Ok(())
    }
}

impl Serializable for Tag {
    type Serializer = TagSerializer;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Shelf {
    pub id: i64,
    pub tags: Vec<Tag>,
}

#[derive(Default)]
pub struct ShelfSerializer {
    pub model: Shelf,
    pub context: Option<SharedContext>,
}

impl Serializer for ShelfSerializer {
    bind_model!(Shelf);

    const STORE_KEY: &'static str = "shelf";

    fn store_id(&self) -> StoreId {
        StoreId::from(self.model.id)
    }

    fn make_fields(&self, b: &mut FieldBuilder<Self>) -> ScribeResult<()> {
        b.read_only("tagCount", self.model.tags.len() as i64)?;
        Ok(())
    }

    fn side_load_resources(&self, b: &mut SideLoadedResourceBuilder) -> ScribeResult<()> {
        b.add_all(self.model.tags.iter().cloned());
        Ok(())
    }
}

impl Serializable for Shelf {
    type Serializer = ShelfSerializer;
}

pub fn tag(id: i64, label: &str) -> Tag {
    Tag {
        id,
        label: label.to_string(),
        bad_key: false,
    }
}

// ── Badly keyed serializers ──────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Counter {
    pub n: i64,
}

/// Files its resources under the default primary key.
#[derive(Default)]
pub struct ShadowingCounterSerializer {
    pub model: Counter,
    pub context: Option<SharedContext>,
}

impl Serializer for ShadowingCounterSerializer {
    bind_model!(Counter);

    const STORE_KEY: &'static str = "_primary";

    fn store_id(&self) -> StoreId {
        StoreId::from(self.model.n)
    }

    fn make_fields(&self, b: &mut FieldBuilder<Self>) -> ScribeResult<()> {
        b.field("n", self.model.n, |s, v| s.model.n = v)?;
        Ok(())
    }
}

#[derive(Default)]
pub struct BlankCounterSerializer {
    pub model: Counter,
    pub context: Option<SharedContext>,
}

impl Serializer for BlankCounterSerializer {
    bind_model!(Counter);

    const STORE_KEY: &'static str = " ";

    fn store_id(&self) -> StoreId {
        StoreId::from(self.model.n)
    }

    fn make_fields(&self, b: &mut FieldBuilder<Self>) -> ScribeResult<()> {
        b.field("n", self.model.n, |s, v| s.model.n = v)?;
        Ok(())
    }
}
