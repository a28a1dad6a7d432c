use crate::input::EnergyCarrier;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{Display, EnumCount as EnumCountMacro, EnumIter};

#[derive(Clone, Copy, Debug, Display, EnumCountMacro, EnumIter, Eq, Hash, PartialEq)]
pub enum FuelType {
    Electricity,
    Gas,
}

impl From<EnergyCarrier> for FuelType {
    fn from(carrier: EnergyCarrier) -> Self {
        match carrier {
            EnergyCarrier::Electric => FuelType::Electricity,
            EnergyCarrier::Gas => FuelType::Gas,
        }
    }
}

#[derive(Clone, Copy, Debug, Display, EnumCountMacro, EnumIter, Eq, Hash, PartialEq)]
pub enum EndUseCategory {
    Heating,
    Cooling,
    InteriorLights,
    ExteriorLights,
    Fans,
    Pumps,
    InteriorEquipment,
    ExteriorEquipment,
    WaterSystems,
}

/// Energy by fuel and end-use category for one period, in kWh/m2.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EndUses {
    values: [[f64; EndUseCategory::COUNT]; FuelType::COUNT],
}

impl EndUses {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn add(&mut self, fuel: FuelType, category: EndUseCategory, value: f64) {
        self.values[fuel as usize][category as usize] += value;
    }

    pub fn get(&self, fuel: FuelType, category: EndUseCategory) -> f64 {
        self.values[fuel as usize][category as usize]
    }

    pub fn total(&self) -> f64 {
        self.values.iter().flatten().sum()
    }

    pub fn total_for_fuel(&self, fuel: FuelType) -> f64 {
        self.values[fuel as usize].iter().sum()
    }

    pub fn total_for_category(&self, category: EndUseCategory) -> f64 {
        self.values.iter().map(|row| row[category as usize]).sum()
    }

    /// Every (fuel, category) pair with its value, electricity first.
    pub fn iter(&self) -> impl Iterator<Item = (FuelType, EndUseCategory, f64)> + '_ {
        FuelType::iter().flat_map(move |fuel| {
            EndUseCategory::iter().map(move |category| (fuel, category, self.get(fuel, category)))
        })
    }
}

impl AddAssign<&EndUses> for EndUses {
    fn add_assign(&mut self, other: &EndUses) {
        for (fuel, category, value) in other.iter() {
            self.add(fuel, category, value);
        }
    }
}

impl Add<&EndUses> for EndUses {
    type Output = EndUses;

    fn add(mut self, other: &EndUses) -> EndUses {
        self += other;
        self
    }
}

impl<'a> Sum<&'a EndUses> for EndUses {
    fn sum<I: Iterator<Item = &'a EndUses>>(iter: I) -> Self {
        iter.fold(EndUses::new(), |total, end_uses| total + end_uses)
    }
}
