//! Deployment orchestration
//!
//! Deploys `DiamondCutFacet`, the diamond and the facet set, then wires every
//! facet in a single Add batch that also runs the initializer. Selector lists
//! come from the facets' declarations and are not checked against the code.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use alloy_primitives::{Address, Bytes};
use serde::{Deserialize, Serialize};

use crate::{
    chain::LocalChain,
    client::DiamondClient,
    facets::{DiamondCutFacet, DiamondInit, FacetCode, InitConfig},
    selectors::SelectorList,
    types::{DiamondArgs, FacetCut, InitCall, Selector},
    utils::error::{CutError, DiamondError, DiamondResult},
};

/// A facet to deploy, declared by name and canonical function signatures
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetManifest {
    pub name: String,
    pub signatures: Vec<String>,
}

impl FacetManifest {
    pub fn selectors(&self) -> DiamondResult<SelectorList> {
        SelectorList::from_signatures(&self.signatures)
    }
}

/// JSON description of a deployment
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentManifest {
    pub facets: Vec<FacetManifest>,
    /// Runs `DiamondInit` with this configuration in the wiring batch
    #[serde(default)]
    pub init: Option<InitConfig>,
}

impl DeploymentManifest {
    pub fn from_json(json: &str) -> DiamondResult<Self> {
        serde_json::from_str(json)
            .map_err(|err| DiamondError::DecodingError(format!("invalid manifest: {}", err)))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetDeployment {
    pub name: String,
    pub address: Address,
    pub selectors: Vec<Selector>,
}

/// Addresses of everything a deployment created
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentReport {
    pub owner: Address,
    pub diamond: Address,
    pub diamond_cut_facet: Address,
    pub diamond_init: Option<Address>,
    /// Hex-encoded initializer calldata
    pub init_calldata: Option<String>,
    /// Facets wired by the deployment batch, in deployment order
    pub facets: Vec<FacetDeployment>,
}

impl DeploymentReport {
    pub fn to_json_pretty(&self) -> DiamondResult<String> {
        serde_json::to_string_pretty(self).map_err(|err| DiamondError::Custom(err.to_string()))
    }
}

struct DeclaredFacet {
    name: String,
    code: Arc<dyn FacetCode>,
    selectors: SelectorList,
}

pub struct Orchestrator;

impl Orchestrator {
    /// Deploys a diamond owned by `owner` with `facets` and the optional
    /// `(initializer code, calldata)` pair. Each facet is routed for the
    /// selectors returned by its `selectors()`.
    pub fn deploy_diamond(
        chain: &mut LocalChain,
        owner: Address,
        facets: Vec<Arc<dyn FacetCode>>,
        init: Option<(Arc<dyn FacetCode>, Bytes)>,
    ) -> DiamondResult<DeploymentReport> {
        let declared = facets
            .into_iter()
            .map(|code| DeclaredFacet {
                name: code.name(),
                selectors: code.selectors().into_iter().collect(),
                code,
            })
            .collect();
        Self::deploy_declared(chain, owner, declared, init)
    }

    /// Deploys the facets of `manifest`, resolving each declared name to its
    /// code with `resolve`. Facets are routed for the declared signatures.
    pub fn deploy_manifest<R>(
        chain: &mut LocalChain,
        owner: Address,
        manifest: &DeploymentManifest,
        resolve: R,
    ) -> DiamondResult<DeploymentReport>
    where
        R: Fn(&str) -> Option<Arc<dyn FacetCode>>,
    {
        let declared = manifest
            .facets
            .iter()
            .map(|facet| {
                let code = resolve(&facet.name).ok_or_else(|| {
                    DiamondError::Custom(format!("no code known for facet `{}`", facet.name))
                })?;
                Ok(DeclaredFacet {
                    name: facet.name.clone(),
                    code,
                    selectors: facet.selectors()?,
                })
            })
            .collect::<DiamondResult<Vec<_>>>()?;

        let init = manifest.init.as_ref().map(|config| {
            let code: Arc<dyn FacetCode> = Arc::new(DiamondInit);
            (code, config.calldata())
        });
        Self::deploy_declared(chain, owner, declared, init)
    }

    fn deploy_declared(
        chain: &mut LocalChain,
        owner: Address,
        facets: Vec<DeclaredFacet>,
        init: Option<(Arc<dyn FacetCode>, Bytes)>,
    ) -> DiamondResult<DeploymentReport> {
        // an initializer needs at least one cut instruction to run with
        if facets.is_empty() && init.is_some() {
            return Err(CutError::EmptyCut.into());
        }

        let diamond_cut_facet = chain.deploy(owner, DiamondCutFacet);
        tracing::info!(address = %diamond_cut_facet, "DiamondCutFacet deployed");

        let diamond = chain.deploy_diamond(
            owner,
            DiamondArgs {
                owner,
                diamond_cut_facet,
            },
        )?;
        tracing::info!(address = %diamond, "Diamond deployed");

        let init = init.map(|(code, calldata)| {
            let name = code.name();
            let target = chain.deploy_code(owner, code);
            tracing::info!(address = %target, "{} deployed", name);
            InitCall::new(target, calldata)
        });

        let mut deployments = Vec::with_capacity(facets.len());
        let mut cuts = Vec::with_capacity(facets.len());
        for facet in facets {
            let address = chain.deploy_code(owner, facet.code);
            tracing::info!(%address, "{} deployed", facet.name);
            cuts.push(FacetCut::add(address, facet.selectors.iter().copied()));
            deployments.push(FacetDeployment {
                name: facet.name,
                address,
                selectors: facet.selectors.into_vec(),
            });
        }

        if !cuts.is_empty() {
            DiamondClient::new(diamond).diamond_cut(chain, owner, &cuts, init.as_ref())?;
            tracing::info!(%diamond, facets = cuts.len(), "diamond cut complete");
        }

        Ok(DeploymentReport {
            owner,
            diamond,
            diamond_cut_facet,
            diamond_init: init.as_ref().map(|init| init.target),
            init_calldata: init
                .as_ref()
                .map(|init| format!("0x{}", hex::encode(&init.calldata))),
            facets: deployments,
        })
    }

    /// Checks the diamond's loupe against `report`: the registered facets are
    /// exactly the reported facets plus the cut facet, each routed for exactly
    /// its reported selectors.
    pub fn verify(chain: &LocalChain, report: &DeploymentReport) -> DiamondResult<()> {
        let client = DiamondClient::new(report.diamond);
        let registered: HashSet<Address> = client.facet_addresses(chain)?.into_iter().collect();

        let expected: HashMap<Address, Vec<Selector>> = report
            .facets
            .iter()
            .map(|facet| (facet.address, facet.selectors.clone()))
            .chain(std::iter::once((
                report.diamond_cut_facet,
                DiamondCutFacet.selectors(),
            )))
            .collect();

        if let Some(missing) = expected.keys().find(|facet| !registered.contains(*facet)) {
            return Err(DiamondError::Custom(format!(
                "facet {} is not registered",
                missing
            )));
        }
        if let Some(unexpected) = registered.iter().find(|facet| !expected.contains_key(*facet)) {
            return Err(DiamondError::Custom(format!(
                "facet {} is registered but not part of the deployment",
                unexpected
            )));
        }

        for (facet, selectors) in expected {
            let actual: HashSet<Selector> = client
                .facet_function_selectors(chain, facet)?
                .into_iter()
                .collect();
            let wanted: HashSet<Selector> = selectors.into_iter().collect();
            if actual != wanted {
                return Err(DiamondError::Custom(format!(
                    "facet {} routes {} selectors, expected {}",
                    facet,
                    actual.len(),
                    wanted.len()
                )));
            }
        }
        Ok(())
    }
}
