use crate::areas::repository::Repository;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;

impl Repository {
    /// Print the blob digest of a file, storing the blob when `write` is set
    pub fn hash_object(&mut self, object_path: &str, write: bool) -> anyhow::Result<ObjectId> {
        let object_data = self.workspace().read_file(object_path)?;
        let object = Blob::new(object_data, Default::default());

        let object_id = if write {
            self.ensure_initialized()?;
            self.database().store(&object)?
        } else {
            object.object_id()?
        };

        writeln!(self.writer(), "{object_id}")?;

        Ok(object_id)
    }
}
