use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::Result;
use bytes::Bytes;

pub trait Packable {
    fn serialize(&self) -> Result<Bytes>;
}

pub trait Object: Packable {
    fn object_type(&self) -> ObjectType;

    /// Digest of the framed payload returned by `serialize`
    fn object_id(&self) -> Result<ObjectId> {
        let content = self.serialize()?;
        Ok(ObjectId::hash(&content))
    }
}
