use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::{FromPrimitive, ToPrimitive};
use std::io::{Read, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive)]
enum Tag {
	Leaf = 0,
	Children = 1,
}

impl Tag {
	fn write<W: Write>(self, writer: &mut W) -> std::io::Result<()> {
		// Both variants fit in a u16
		writer.write_u16::<BigEndian>(self.to_u16().unwrap_or_default())
	}

	fn read<R: Read>(reader: &mut R) -> std::io::Result<Self> {
		let raw = reader.read_u16::<BigEndian>()?;

		Tag::from_u16(raw).ok_or_else(|| std::io::Error::new(
			std::io::ErrorKind::InvalidData,
			format!("unknown tree node type {:?}", raw),
		))
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct Split {
	pub value: f64,
	pub column: usize,
}

impl Split {
	pub fn serialize<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
		writer.write_f64::<BigEndian>(self.value)?;
		writer.write_u16::<BigEndian>(self.column as u16)?;

		Ok(())
	}

	pub fn deserialize<R: Read>(reader: &mut R) -> std::io::Result<Self> {
		let value = reader.read_f64::<BigEndian>()?;
		let column = reader.read_u16::<BigEndian>()? as usize;

		Ok(Self { value, column })
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
	/// Majority class and positive-class fraction of the training rows that reached it.
	Leaf { label: f64, proba: f64 },
	Children {
		left: Box<Node>,
		right: Box<Node>,
		split: Split,
	},
}

impl Node {
	fn leaf(&self, x: &[f64]) -> (f64, f64) {
		let mut node = self;

		loop {
			match node {
				Node::Leaf { label, proba } => return (*label, *proba),
				Node::Children { left, right, split } => {
					node = if x[split.column] <= split.value { &**left } else { &**right };
				},
			}
		}
	}

	pub fn predict(&self, x: &[f64]) -> f64 {
		self.leaf(x).0
	}

	pub fn predict_proba(&self, x: &[f64]) -> f64 {
		self.leaf(x).1
	}

	pub fn depth(&self) -> usize {
		match self {
			Node::Leaf { .. } => 1,
			Node::Children { left, right, .. } => 1 + left.depth().max(right.depth()),
		}
	}

	/// Highest feature index referenced by a split.
	pub fn max_column(&self) -> Option<usize> {
		match self {
			Node::Leaf { .. } => None,
			Node::Children { left, right, split } => [Some(split.column), left.max_column(), right.max_column()]
				.iter()
				.flatten()
				.copied()
				.max(),
		}
	}

	pub fn serialize<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
		match &self {
			Node::Leaf { label, proba } => {
				Tag::Leaf.write(writer)?;
				writer.write_f64::<BigEndian>(*label)?;
				writer.write_f64::<BigEndian>(*proba)?;
			},
			Node::Children { left, right, split } => {
				Tag::Children.write(writer)?;
				split.serialize(writer)?;
				left.serialize(writer)?;
				right.serialize(writer)?;
			}
		}

		Ok(())
	}

	pub fn deserialize<R: Read>(reader: &mut R) -> std::io::Result<Self> {
		match Tag::read(reader)? {
			Tag::Leaf => {
				let label = reader.read_f64::<BigEndian>()?;
				let proba = reader.read_f64::<BigEndian>()?;

				if !(0.0..=1.0).contains(&proba) {
					return Err(std::io::Error::new(
						std::io::ErrorKind::InvalidData,
						format!("leaf probability {} outside [0, 1]", proba),
					));
				}

				Ok(Node::Leaf { label, proba })
			},
			Tag::Children => {
				let split = Split::deserialize(reader)?;
				let left = Box::new(Node::deserialize(reader)?);
				let right = Box::new(Node::deserialize(reader)?);

				Ok(Node::Children { split, left, right })
			},
		}
	}
}
