//! Protobuf fixtures shared by the integration tests.
//!
//! Descriptors are assembled by hand from `prost-types` so the tests need no
//! `protoc`. The structs mirror them with `prost` derives, a `ReflectMessage`
//! impl, and camelCase serde so they can stand in for either message family.

#![allow(dead_code)]

use std::sync::LazyLock;

use prost::Message as _;
use prost_reflect::{DescriptorPool, MessageDescriptor, ReflectMessage};
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{
    DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto, FieldDescriptorProto,
    FileDescriptorProto, FileDescriptorSet,
};
use serde::{Deserialize, Serialize};

pub static POOL: LazyLock<DescriptorPool> = LazyLock::new(|| {
    let set = FileDescriptorSet {
        file: vec![greeter_file(), ledger_file()],
    };
    DescriptorPool::decode(set.encode_to_vec().as_slice()).expect("fixture descriptors are valid")
});

pub fn descriptor(name: &str) -> MessageDescriptor {
    POOL.get_message_by_name(name)
        .unwrap_or_else(|| panic!("missing fixture descriptor {name}"))
}

/// Route test logs through the harness's captured output.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

fn field(
    name: &str,
    json_name: &str,
    number: i32,
    label: Label,
    ty: Type,
    type_name: Option<&str>,
) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_owned()),
        json_name: Some(json_name.to_owned()),
        number: Some(number),
        label: Some(label as i32),
        r#type: Some(ty as i32),
        type_name: type_name.map(str::to_owned),
        ..Default::default()
    }
}

fn message(name: &str, fields: Vec<FieldDescriptorProto>) -> DescriptorProto {
    DescriptorProto {
        name: Some(name.to_owned()),
        field: fields,
        ..Default::default()
    }
}

// test/v1/greeter.proto (proto3)
fn greeter_file() -> FileDescriptorProto {
    let mood = EnumDescriptorProto {
        name: Some("Mood".to_owned()),
        value: ["MOOD_UNSPECIFIED", "MOOD_HAPPY", "MOOD_SAD"]
            .into_iter()
            .zip(0..)
            .map(|(name, number)| EnumValueDescriptorProto {
                name: Some(name.to_owned()),
                number: Some(number),
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    };

    FileDescriptorProto {
        name: Some("test/v1/greeter.proto".to_owned()),
        package: Some("test.v1".to_owned()),
        syntax: Some("proto3".to_owned()),
        enum_type: vec![mood],
        message_type: vec![
            message(
                "Address",
                vec![field("city", "city", 1, Label::Optional, Type::String, None)],
            ),
            message(
                "HelloRequest",
                vec![
                    field("user_name", "userName", 1, Label::Optional, Type::String, None),
                    field("mood", "mood", 2, Label::Optional, Type::Enum, Some(".test.v1.Mood")),
                    field(
                        "address",
                        "address",
                        3,
                        Label::Optional,
                        Type::Message,
                        Some(".test.v1.Address"),
                    ),
                    field("visits", "visits", 4, Label::Optional, Type::Int64, None),
                    field("tags", "tags", 5, Label::Repeated, Type::String, None),
                ],
            ),
        ],
        ..Default::default()
    }
}

// test/v2/ledger.proto (proto2)
fn ledger_file() -> FileDescriptorProto {
    FileDescriptorProto {
        name: Some("test/v2/ledger.proto".to_owned()),
        package: Some("test.v2".to_owned()),
        syntax: Some("proto2".to_owned()),
        message_type: vec![
            message(
                "Account",
                vec![
                    field("id", "id", 1, Label::Required, Type::String, None),
                    field("note", "note", 2, Label::Optional, Type::String, None),
                ],
            ),
            message(
                "Ledger",
                vec![field(
                    "accounts",
                    "accounts",
                    1,
                    Label::Repeated,
                    Type::Message,
                    Some(".test.v2.Account"),
                )],
            ),
        ],
        ..Default::default()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum Mood {
    Unspecified = 0,
    Happy = 1,
    Sad = 2,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    #[prost(string, tag = "1")]
    pub city: String,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HelloRequest {
    #[prost(string, tag = "1")]
    pub user_name: String,
    #[prost(enumeration = "Mood", tag = "2")]
    pub mood: i32,
    #[prost(message, optional, tag = "3")]
    pub address: Option<Address>,
    #[prost(int64, tag = "4")]
    pub visits: i64,
    #[prost(string, repeated, tag = "5")]
    pub tags: Vec<String>,
}

impl ReflectMessage for HelloRequest {
    fn descriptor(&self) -> MessageDescriptor {
        descriptor("test.v1.HelloRequest")
    }
}

impl HelloRequest {
    pub fn sample() -> Self {
        Self {
            user_name: "ada".to_owned(),
            mood: Mood::Happy as i32,
            address: Some(Address {
                city: "Paris".to_owned(),
            }),
            visits: 3,
            tags: vec!["a".to_owned(), "b".to_owned()],
        }
    }
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Account {
    #[prost(string, required, tag = "1")]
    pub id: String,
    #[prost(string, optional, tag = "2")]
    pub note: Option<String>,
}

impl ReflectMessage for Account {
    fn descriptor(&self) -> MessageDescriptor {
        descriptor("test.v2.Account")
    }
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Ledger {
    #[prost(message, repeated, tag = "1")]
    pub accounts: Vec<Account>,
}

impl ReflectMessage for Ledger {
    fn descriptor(&self) -> MessageDescriptor {
        descriptor("test.v2.Ledger")
    }
}
